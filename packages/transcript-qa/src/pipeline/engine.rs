//! Pipeline orchestration.
//!
//! `TranscriptQa` wires parsing, understanding, retrieval, synthesis,
//! and verification together. Both the language model and the embedding
//! provider are optional; the engine answers extractively without them
//! and never returns an error to the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::pipeline::{extractive, parser, retrieval, synthesis, understanding, verify};
use crate::traits::{EmbeddingProvider, LanguageModel};
use crate::types::{
    Confidence, QaConfig, QueryIntent, QueryUnderstanding, ResponseStatus, RetrievalResult,
    TranscriptDocument, TranscriptQaResponse,
};

/// Transcript question answering engine.
#[derive(Clone)]
pub struct TranscriptQa {
    model: Option<Arc<dyn LanguageModel>>,
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    config: QaConfig,
}

impl TranscriptQa {
    /// Fully extractive engine with default settings.
    pub fn new() -> Self {
        TranscriptQa {
            model: None,
            embeddings: None,
            config: QaConfig::default(),
        }
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_embeddings(mut self, embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn with_config(mut self, config: QaConfig) -> Self {
        self.config = config;
        self
    }

    /// Answer a question about a raw transcript.
    pub async fn answer(&self, query: &str, transcript_text: &str) -> TranscriptQaResponse {
        let document = parser::parse(transcript_text);
        self.answer_document(query, &document).await
    }

    /// Answer a question about an already-parsed transcript.
    pub async fn answer_document(
        &self,
        query: &str,
        document: &TranscriptDocument,
    ) -> TranscriptQaResponse {
        let model = self.model.as_deref();

        let understanding = understanding::understand(
            query,
            document.script,
            document.duration_seconds(),
            model,
            self.config.model_timeout,
        )
        .await;

        let retrieval = retrieval::retrieve(
            document,
            &understanding,
            self.embeddings.as_deref(),
            &self.config,
        )
        .await;

        if retrieval.evidence.is_empty() {
            info!(query, "no evidence retrieved");
            return TranscriptQaResponse {
                content: extractive::insufficient_evidence_message(
                    understanding.prefer_chinese,
                    understanding.time_range.is_some(),
                ),
                status: ResponseStatus::InsufficientEvidence,
                evidence: Vec::new(),
                confidence: Confidence::Low,
            };
        }

        let draft = synthesis::synthesize(&understanding, &retrieval, model, &self.config).await;

        let verdict = verify::verify(&draft, &retrieval.evidence, understanding.intent);
        let content = if verdict.ok {
            draft
        } else {
            let reason = verdict.reason.map(|r| r.as_str()).unwrap_or("unknown");
            warn!(reason, "draft rejected; rendering extractive answer");
            self.extractive_answer(&understanding, &retrieval)
        };

        let status = if verdict.ok || retrieval.confidence != Confidence::Low {
            ResponseStatus::Answered
        } else {
            ResponseStatus::InsufficientEvidence
        };

        info!(
            query,
            intent = ?understanding.intent,
            mode = ?retrieval.mode,
            confidence = ?retrieval.confidence,
            status = ?status,
            evidence = retrieval.evidence.len(),
            "query answered"
        );

        TranscriptQaResponse {
            content,
            status,
            evidence: retrieval.evidence,
            confidence: retrieval.confidence,
        }
    }

    fn extractive_answer(
        &self,
        understanding: &QueryUnderstanding,
        retrieval: &RetrievalResult,
    ) -> String {
        match &understanding.time_range {
            Some(range) => extractive::render_time_range(
                &retrieval.evidence,
                range,
                understanding.prefer_chinese,
                &self.config,
            ),
            None => extractive::render_summary(
                &retrieval.evidence,
                understanding.prefer_chinese,
                understanding.intent == QueryIntent::TimeRange,
                &self.config,
            ),
        }
    }
}

impl Default for TranscriptQa {
    fn default() -> Self {
        TranscriptQa::new()
    }
}

impl std::fmt::Debug for TranscriptQa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptQa")
            .field("has_model", &self.model.is_some())
            .field("has_embeddings", &self.embeddings.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// One-shot convenience wrapper around [`TranscriptQa`].
pub async fn answer_video_query_from_transcript(
    model: Option<Arc<dyn LanguageModel>>,
    user_query: &str,
    transcript_text: &str,
) -> TranscriptQaResponse {
    let mut engine = TranscriptQa::new();
    if let Some(model) = model {
        engine = engine.with_model(model);
    }
    engine.answer(user_query, transcript_text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLanguageModel;

    const TRANSCRIPT: &str = "\
[00:00:00.000 --> 00:00:10.000] Welcome to the sourdough baking class.
[00:00:10.000 --> 00:00:20.000] First we feed the starter with flour and water.
[00:00:20.000 --> 00:00:30.000] Then we mix the dough and let it rest.";

    #[tokio::test]
    async fn test_extractive_engine_answers_summary() {
        let engine = TranscriptQa::new();
        let response = engine.answer("what is this video about", TRANSCRIPT).await;

        assert_eq!(response.status, ResponseStatus::Answered);
        assert!(response.content.starts_with("Video highlights:"));
        assert!(response.content.contains("[E1]"));
        assert_eq!(response.confidence, Confidence::Medium);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_insufficient() {
        let engine = TranscriptQa::new();
        let response = engine.answer("anything", "").await;

        assert_eq!(response.status, ResponseStatus::InsufficientEvidence);
        assert!(response.evidence.is_empty());
        assert_eq!(response.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn test_rejected_draft_falls_back_extractively() {
        // Understanding call gets a factoid classification; the synthesis
        // call then produces an uncited draft, which fails verification.
        let model = MockLanguageModel::new()
            .with_reply(r#"{"intent":"factoid","keywords":["starter"]}"#)
            .with_reply("The starter is fed daily.");
        let engine = TranscriptQa::new().with_model(Arc::new(model));

        let response = engine.answer("how do you feed the starter", TRANSCRIPT).await;

        assert!(response.content.starts_with("Video highlights:"));
        assert!(response.content.contains("[E1]"));
    }

    #[tokio::test]
    async fn test_convenience_wrapper() {
        let response =
            answer_video_query_from_transcript(None, "what is this video about", TRANSCRIPT).await;
        assert_eq!(response.status, ResponseStatus::Answered);
    }
}
