use serde::Serialize;

use crate::srt::Cue;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCaption {
    pub start_in_seconds: f64,
    pub end_in_seconds: f64,
    pub text: String,
}

// `text` carries a leading space (" word"), the player concatenates them
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCaption {
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub timestamp_ms: i64,
    pub confidence: f64,
}

pub trait Shaper {
    fn name(&self) -> &'static str;

    fn shape(&mut self, cues: &[Cue]) -> serde_json::Result<serde_json::Value>;
}

pub trait ConfidenceSource {
    fn next_confidence(&mut self) -> f64;
}

// placeholder, not a real score
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomConfidence;

impl ConfidenceSource for RandomConfidence {
    fn next_confidence(&mut self) -> f64 {
        rand::random_range(0.5..1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedConfidence(pub f64);

impl ConfidenceSource for FixedConfidence {
    fn next_confidence(&mut self) -> f64 {
        self.0
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LineShaper;

impl LineShaper {
    pub fn captions(&self, cues: &[Cue]) -> Vec<LineCaption> {
        cues.iter()
            .map(|cue| LineCaption {
                start_in_seconds: cue.start.as_seconds(),
                end_in_seconds: cue.end.as_seconds(),
                text: cue.text.clone(),
            })
            .collect()
    }
}

impl Shaper for LineShaper {
    fn name(&self) -> &'static str {
        "lines"
    }

    fn shape(&mut self, cues: &[Cue]) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.captions(cues))
    }
}

#[derive(Debug, Clone)]
pub struct WordShaper<C> {
    confidence: C,
}

impl<C: ConfidenceSource> WordShaper<C> {
    pub fn new(confidence: C) -> Self {
        Self { confidence }
    }

    pub fn captions(&mut self, cues: &[Cue]) -> Vec<WordCaption> {
        let mut words = Vec::new();

        for cue in cues {
            let start_ms = cue.start.as_millis();
            let end_ms = cue.end.as_millis();
            // floor of the midpoint; start + end can overflow
            let timestamp_ms = start_ms + (end_ms - start_ms).div_euclid(2);

            for word in split_words(&cue.text) {
                words.push(WordCaption {
                    text: format!(" {word}"),
                    start_ms,
                    end_ms,
                    timestamp_ms,
                    confidence: self.confidence.next_confidence(),
                });
            }
        }

        words
    }
}

impl<C: ConfidenceSource> Shaper for WordShaper<C> {
    fn name(&self) -> &'static str {
        "words"
    }

    fn shape(&mut self, cues: &[Cue]) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.captions(cues))
    }
}

/// Splits on every single space. Consecutive spaces yield empty words,
/// which are kept.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srt::parse_srt;
    use serde_json::json;

    fn cues() -> Vec<Cue> {
        parse_srt(
            "1\n00:00:01,000 --> 00:00:02,001\nHello there\n\n\
             2\n00:01:02,500 --> 00:01:03,000\nhello   world",
        )
        .cues
    }

    #[test]
    fn test_split_words_keeps_empty_tokens() {
        let words: Vec<_> = split_words("hello   world").collect();
        assert_eq!(words, ["hello", "", "", "world"]);

        let words: Vec<_> = split_words("").collect();
        assert_eq!(words, [""]);
    }

    #[test]
    fn test_line_captions() {
        let captions = LineShaper.captions(&cues());
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].start_in_seconds, 1.0);
        assert_eq!(captions[0].end_in_seconds, 2.001);
        assert_eq!(captions[1].start_in_seconds, 62.5);
        assert_eq!(captions[1].text, "hello   world");
    }

    #[test]
    fn test_line_json_shape() {
        let value = LineShaper.shape(&cues()[..1]).unwrap();
        assert_eq!(
            value,
            json!([{ "startInSeconds": 1.0, "endInSeconds": 2.001, "text": "Hello there" }])
        );
    }

    #[test]
    fn test_word_captions_share_cue_span() {
        let mut shaper = WordShaper::new(FixedConfidence(0.75));
        let captions = shaper.captions(&cues());

        // 2 words + 4 tokens from the spaced cue
        assert_eq!(captions.len(), 6);

        assert_eq!(captions[0].text, " Hello");
        assert_eq!(captions[1].text, " there");
        for caption in &captions[..2] {
            assert_eq!(caption.start_ms, 1000);
            assert_eq!(caption.end_ms, 2001);
            // floor of 1500.5
            assert_eq!(caption.timestamp_ms, 1500);
        }

        let texts: Vec<_> = captions[2..].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, [" hello", " ", " ", " world"]);
        assert!(captions[2..].iter().all(|c| c.start_ms == 62500));
    }

    #[test]
    fn test_word_json_shape() {
        let mut shaper = WordShaper::new(FixedConfidence(0.5));
        let value = shaper.shape(&cues()[..1]).unwrap();
        assert_eq!(
            value[0],
            json!({
                "text": " Hello",
                "startMs": 1000,
                "endMs": 2001,
                "timestampMs": 1500,
                "confidence": 0.5
            })
        );
    }

    #[test]
    fn test_word_midpoint_near_max_timestamp() {
        let parsed = parse_srt("1\n2000000000000:00:00,000 --> 2000000000000:00:00,000\nhuge");
        assert!(parsed.skipped.is_empty());

        let captions = WordShaper::new(FixedConfidence(0.5)).captions(&parsed.cues);
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].timestamp_ms, captions[0].start_ms);
        assert_eq!(captions[0].start_ms, 2_000_000_000_000 * 3_600_000);
    }

    #[test]
    fn test_word_midpoint_floors_inverted_span() {
        let parsed = parse_srt("1\n00:00:02,001 --> 00:00:01,000\nbackwards");
        let captions = WordShaper::new(FixedConfidence(0.5)).captions(&parsed.cues);
        // floor(3001 / 2)
        assert_eq!(captions[0].timestamp_ms, 1500);
    }

    #[test]
    fn test_random_confidence_range() {
        let mut source = RandomConfidence;
        for _ in 0..1000 {
            let value = source.next_confidence();
            assert!((0.5..1.0).contains(&value), "out of range: {value}");
        }
    }
}
