use anyhow::{Context, Result};

use crate::api::{ApiClient, ContentRecord, TranscriptionRecord};

/// Past transcriptions and generated articles, fetched together.
#[derive(Debug)]
pub struct History {
    pub transcriptions: Vec<TranscriptionRecord>,
    pub contents: Vec<ContentRecord>,
}

/// Fetch both history listings concurrently. The backend sorts each
/// latest-first; the client keeps that order.
pub async fn fetch_history(api: &ApiClient) -> Result<History> {
    let (transcriptions, contents) = tokio::join!(api.history(), api.content_history());
    Ok(History {
        transcriptions: transcriptions.context("Failed to fetch transcription history")?,
        contents: contents.context("Failed to fetch content history")?,
    })
}

/// Pick the transcription an article should be generated from: a specific
/// id when given, otherwise the most recent one.
pub fn select_transcription(
    history: &History,
    transcription_id: Option<i64>,
) -> Result<&TranscriptionRecord> {
    match transcription_id {
        Some(id) => history
            .transcriptions
            .iter()
            .find(|record| record.id == id)
            .with_context(|| format!("No transcription with id {} in history", id)),
        None => history
            .transcriptions
            .first()
            .context("Transcription history is empty; transcribe something first"),
    }
}

/// Display title for a transcription record.
pub fn transcription_title(record: &TranscriptionRecord) -> String {
    match &record.title {
        Some(title) if !title.is_empty() => title.clone(),
        _ => {
            let preview: String = record.transcript.chars().take(30).collect();
            if preview.is_empty() {
                "Untitled Transcription".to_string()
            } else {
                preview
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64, title: Option<&str>, transcript: &str) -> TranscriptionRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "source": "YouTube",
            "video_url": "https://youtu.be/x",
            "transcript": transcript,
            "created_at": Utc::now(),
        }))
        .unwrap()
    }

    fn history(transcriptions: Vec<TranscriptionRecord>) -> History {
        History {
            transcriptions,
            contents: Vec::new(),
        }
    }

    #[test]
    fn test_select_by_id() {
        let h = history(vec![record(2, Some("newer"), "b"), record(1, Some("older"), "a")]);
        assert_eq!(select_transcription(&h, Some(1)).unwrap().id, 1);
        assert!(select_transcription(&h, Some(9)).is_err());
    }

    #[test]
    fn test_select_defaults_to_latest() {
        let h = history(vec![record(2, Some("newer"), "b"), record(1, Some("older"), "a")]);
        assert_eq!(select_transcription(&h, None).unwrap().id, 2);
    }

    #[test]
    fn test_select_from_empty_history_fails() {
        let h = history(Vec::new());
        assert!(select_transcription(&h, None).is_err());
    }

    #[test]
    fn test_title_falls_back_to_transcript_preview() {
        let r = record(1, None, "the quick brown fox jumps over the lazy dog");
        assert_eq!(transcription_title(&r), "the quick brown fox jumps over");

        let r = record(1, Some("Named"), "text");
        assert_eq!(transcription_title(&r), "Named");

        let r = record(1, None, "");
        assert_eq!(transcription_title(&r), "Untitled Transcription");
    }
}
