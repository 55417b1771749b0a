/// Ordered collection of markdown bullets with the bot's title-containment
/// dedup rule.
#[derive(Debug, Default)]
pub struct Digest {
    bullets: Vec<String>,
}

impl Digest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `- [title](link)` unless some already-collected bullet contains
    /// `title` as a substring. The check runs against the whole formatted
    /// bullet, so link text participates too. Returns whether the entry was
    /// kept.
    pub fn push(&mut self, title: &str, link: &str) -> bool {
        if self.bullets.iter().any(|bullet| bullet.contains(title)) {
            return false;
        }
        self.bullets.push(format!("- [{}]({})", title, link));
        true
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    /// Newline-joined bullets; empty string when nothing was collected.
    pub fn into_text(self) -> String {
        self.bullets.join("\n")
    }
}
