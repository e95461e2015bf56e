//! Prompts for model-based emotion analysis.

/// Builds the prompt asking for a JSON emotion profile of `content`.
///
/// The field names match what [`crate::ai::parse_emotion_response`] reads.
pub fn emotion_prompt(content: &str) -> String {
    format!(
        r#"Analyze the emotions expressed in the following diary text (it may be Chinese or English).
Reply with JSON only, no other text.

Text:
---
{}
---

Use exactly this format:
{{
  "joy": number between 0.0 and 1.0,
  "sadness": number between 0.0 and 1.0,
  "anger": number between 0.0 and 1.0,
  "fear": number between 0.0 and 1.0,
  "love": number between 0.0 and 1.0,
  "surprise": number between 0.0 and 1.0,
  "disgust": number between 0.0 and 1.0,
  "dominantEmotion": "one of joy/sadness/anger/fear/love/surprise/disgust/neutral",
  "confidence": number between 0.0 and 1.0,
  "sentimentScore": number between -1.0 (negative) and 1.0 (positive),
  "sentimentLabel": "positive/negative/neutral",
  "keywords": ["emotional keywords taken from the text"]
}}"#,
        content
    )
}
