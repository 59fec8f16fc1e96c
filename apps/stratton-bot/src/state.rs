use crate::bot::router::Router;
use crate::services::voice_service::VoiceRelay;

#[derive(Clone)]
pub struct AppState {
    pub router: Router,
    pub voice: VoiceRelay,
}
