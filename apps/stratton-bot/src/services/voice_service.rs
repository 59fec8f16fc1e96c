use crate::error::{BotError, BotResult};
use crate::services::audio_service::AudioDecoder;
use crate::services::gemini_service::{GenerationOutcome, Generator};
use crate::services::speech_service::Transcriber;
use crate::services::subscription_service::SubscriptionStore;
use std::sync::Arc;
use teloxide::types::UserId;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReply {
    pub transcript: String,
    pub outcome: GenerationOutcome,
}

/// Voice note -> PCM -> transcript -> model answer, for subscribers only.
#[derive(Clone)]
pub struct VoiceRelay {
    store: Arc<dyn SubscriptionStore>,
    decoder: Arc<dyn AudioDecoder>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn Generator>,
    language: String,
}

impl VoiceRelay {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        decoder: Arc<dyn AudioDecoder>,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn Generator>,
        language: String,
    ) -> Self {
        Self {
            store,
            decoder,
            transcriber,
            generator,
            language,
        }
    }

    /// Cheap check handlers can run before downloading the attachment.
    pub async fn is_allowed(&self, user_id: UserId) -> bool {
        self.store.is_active(user_id).await
    }

    pub async fn handle(&self, user_id: UserId, audio: &[u8]) -> BotResult<VoiceReply> {
        if !self.store.is_active(user_id).await {
            return Err(BotError::SubscriptionRequired);
        }

        let decoder = self.decoder.clone();
        let bytes = audio.to_vec();
        // Decoding is CPU bound; keep it off the async workers.
        let waveform = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| BotError::AudioDecodeError(format!("decoder task failed: {}", e)))??;
        info!(
            "Voice from user {}: {:.1}s of audio",
            user_id.0,
            waveform.duration_secs()
        );

        let transcript = self.transcriber.transcribe(&waveform, &self.language).await?;
        let outcome = self.generator.generate(&transcript).await;
        if !outcome.is_answered() {
            warn!("Generation degraded for user {}: {:?}", user_id.0, outcome);
        }

        Ok(VoiceReply {
            transcript,
            outcome,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::audio_service::Waveform;
    use crate::services::catalog_service::PlanCatalog;
    use crate::services::gemini_service::SERVICE_ERROR_FALLBACK;
    use crate::services::subscription_service::InMemorySubscriptionStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub(crate) struct FakeDecoder {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl AudioDecoder for FakeDecoder {
        fn decode(&self, bytes: &[u8]) -> BotResult<Waveform> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BotError::AudioDecodeError("bad container".into()));
            }
            Ok(Waveform {
                sample_rate: 16_000,
                samples: bytes.iter().map(|b| *b as i16).collect(),
            })
        }
    }

    pub(crate) struct FakeTranscriber {
        pub calls: AtomicUsize,
        pub result: BotResult<String>,
        pub languages: std::sync::Mutex<Vec<String>>,
    }

    impl FakeTranscriber {
        pub(crate) fn returning(result: BotResult<String>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
                languages: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _waveform: &Waveform, language: &str) -> BotResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.languages.lock().unwrap().push(language.to_string());
            self.result.clone()
        }
    }

    pub(crate) struct FakeGenerator {
        pub calls: AtomicUsize,
        pub outcome: GenerationOutcome,
    }

    impl FakeGenerator {
        pub(crate) fn returning(outcome: GenerationOutcome) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
            }
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> GenerationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                GenerationOutcome::Answered(text) => {
                    GenerationOutcome::Answered(format!("{} ({})", text, prompt))
                }
                other => other.clone(),
            }
        }
    }

    struct Harness {
        store: Arc<InMemorySubscriptionStore>,
        decoder: Arc<FakeDecoder>,
        transcriber: Arc<FakeTranscriber>,
        generator: Arc<FakeGenerator>,
        relay: VoiceRelay,
    }

    fn harness(decoder: FakeDecoder, transcriber: FakeTranscriber, generator: FakeGenerator) -> Harness {
        let store = Arc::new(InMemorySubscriptionStore::new(Arc::new(PlanCatalog::default())));
        let decoder = Arc::new(decoder);
        let transcriber = Arc::new(transcriber);
        let generator = Arc::new(generator);
        let relay = VoiceRelay::new(
            store.clone(),
            decoder.clone(),
            transcriber.clone(),
            generator.clone(),
            "ru-RU".into(),
        );
        Harness {
            store,
            decoder,
            transcriber,
            generator,
            relay,
        }
    }

    fn default_harness() -> Harness {
        harness(
            FakeDecoder::default(),
            FakeTranscriber::returning(Ok("привет".into())),
            FakeGenerator::returning(GenerationOutcome::Answered("ответ".into())),
        )
    }

    #[tokio::test]
    async fn non_subscriber_is_refused_before_any_processing() {
        let h = default_harness();

        let res = h.relay.handle(UserId(5), b"ogg").await;

        assert_eq!(res, Err(BotError::SubscriptionRequired));
        assert!(!h.relay.is_allowed(UserId(5)).await);
        assert_eq!(h.decoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.transcriber.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn subscriber_gets_transcript_and_answer() {
        let h = default_harness();
        h.store.activate(UserId(5), "basic").await.unwrap();

        let reply = h.relay.handle(UserId(5), b"ogg").await.unwrap();

        assert_eq!(reply.transcript, "привет");
        assert_eq!(reply.outcome, GenerationOutcome::Answered("ответ (привет)".into()));
        assert_eq!(h.transcriber.languages.lock().unwrap().as_slice(), ["ru-RU"]);
    }

    #[tokio::test]
    async fn decode_failure_stops_the_pipeline() {
        let h = harness(
            FakeDecoder {
                fail: true,
                ..Default::default()
            },
            FakeTranscriber::returning(Ok("unused".into())),
            FakeGenerator::returning(GenerationOutcome::Answered("unused".into())),
        );
        h.store.activate(UserId(5), "premium").await.unwrap();

        let res = h.relay.handle(UserId(5), b"junk").await;

        assert!(matches!(res, Err(BotError::AudioDecodeError(_))));
        assert_eq!(h.transcriber.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    }

    struct PanickingDecoder;

    impl AudioDecoder for PanickingDecoder {
        fn decode(&self, _bytes: &[u8]) -> BotResult<Waveform> {
            panic!("corrupt frame");
        }
    }

    /// Records which thread `decode` ran on.
    struct ThreadRecordingDecoder {
        thread: std::sync::Mutex<Option<std::thread::ThreadId>>,
    }

    impl AudioDecoder for ThreadRecordingDecoder {
        fn decode(&self, bytes: &[u8]) -> BotResult<Waveform> {
            *self.thread.lock().unwrap() = Some(std::thread::current().id());
            Ok(Waveform {
                sample_rate: 16_000,
                samples: bytes.iter().map(|b| *b as i16).collect(),
            })
        }
    }

    // `#[tokio::test]` drives everything on the test thread, so any other
    // thread id means the decode went to the blocking pool.
    #[tokio::test]
    async fn decoding_runs_on_the_blocking_pool() {
        let store = Arc::new(InMemorySubscriptionStore::new(Arc::new(PlanCatalog::default())));
        store.activate(UserId(5), "basic").await.unwrap();
        let decoder = Arc::new(ThreadRecordingDecoder {
            thread: std::sync::Mutex::new(None),
        });
        let relay = VoiceRelay::new(
            store,
            decoder.clone(),
            Arc::new(FakeTranscriber::returning(Ok("привет".into()))),
            Arc::new(FakeGenerator::returning(GenerationOutcome::Answered("ответ".into()))),
            "ru-RU".into(),
        );

        assert!(relay.handle(UserId(5), b"ogg").await.is_ok());

        let decoded_on = decoder.thread.lock().unwrap().expect("decoder was not called");
        assert_ne!(decoded_on, std::thread::current().id());
    }

    #[tokio::test]
    async fn decoder_panic_becomes_a_decode_error() {
        let store = Arc::new(InMemorySubscriptionStore::new(Arc::new(PlanCatalog::default())));
        store.activate(UserId(5), "basic").await.unwrap();
        let transcriber = Arc::new(FakeTranscriber::returning(Ok("unused".into())));
        let relay = VoiceRelay::new(
            store,
            Arc::new(PanickingDecoder),
            transcriber.clone(),
            Arc::new(FakeGenerator::returning(GenerationOutcome::Answered("unused".into()))),
            "ru-RU".into(),
        );

        let res = relay.handle(UserId(5), b"ogg").await;

        assert!(matches!(res, Err(BotError::AudioDecodeError(_))));
        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unrecognized_speech_is_reported_without_generation() {
        let h = harness(
            FakeDecoder::default(),
            FakeTranscriber::returning(Err(BotError::SpeechNotRecognized)),
            FakeGenerator::returning(GenerationOutcome::Answered("unused".into())),
        );
        h.store.activate(UserId(5), "basic").await.unwrap();

        assert_eq!(
            h.relay.handle(UserId(5), b"ogg").await,
            Err(BotError::SpeechNotRecognized)
        );
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn degraded_generation_still_yields_a_reply() {
        let h = harness(
            FakeDecoder::default(),
            FakeTranscriber::returning(Ok("вопрос".into())),
            FakeGenerator::returning(GenerationOutcome::Degraded(SERVICE_ERROR_FALLBACK.into())),
        );
        h.store.activate(UserId(5), "basic").await.unwrap();

        let reply = h.relay.handle(UserId(5), b"ogg").await.unwrap();
        assert_eq!(reply.outcome.text(), SERVICE_ERROR_FALLBACK);
    }
}
