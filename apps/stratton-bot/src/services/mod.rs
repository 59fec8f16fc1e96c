pub mod audio_service;
pub mod catalog_service;
pub mod gemini_service;
pub mod pay_service;
pub mod speech_service;
pub mod subscription_service;
pub mod voice_service;
