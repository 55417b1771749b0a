use chrono::NaiveDate;

/// Build the full generation instruction for one run.
///
/// The template is fixed; only the current date and the news digest are
/// interpolated, so the output is deterministic for a given pair.
pub fn build_prompt(today: NaiveDate, digest: &str) -> String {
    let date = today.format("%B %-d, %Y");
    format!(
        r#"You are a senior frontend developer with ten years of experience and a LinkedIn influencer with 100,000 followers.
Today's date is {date}.

[Today's latest frontend news candidates]
{digest}

**Mission:**
1. From the news list above, select the ONE hottest topic that working frontend developers would find most interesting or most useful in practice.
2. Write a LinkedIn post about that topic.

**Format:**
- **Title:** a curiosity-provoking title that includes an emoji
- **Body:**
    - **Hook:** open with a question or a strong statement developers relate to
    - **Insight:** explain why the trend or technology matters, and its strengths and weaknesses, clearly and simply
    - **Action items:** three practical tips as bullet points
    - **Conclusion:** close by inviting comments
- **Reference link:** leave the chosen item's original link at the very bottom as "🔗 Read the original"
- **Hashtags:** five, e.g. #Frontend #WebDev #Trends
- **Tone:** professional but friendly
"#
    )
}
