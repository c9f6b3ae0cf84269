use std::time::Instant;

use serde::Deserialize;

use crate::engine::{HintEngine, Key, SpeechEvent};
use crate::models::RawCandidate;
use crate::settings::HintSettings;

/// Inbound events from the host, one JSON object per line on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum InputEvent {
    Pointer { x: f64, y: f64 },
    Candidates { candidates: Vec<RawCandidate> },
    Key { key: String },
    BadgeClick { ordinal: usize },
    StrayClick,
    Speech(SpeechEvent),
    SpeechUnavailable { reason: String },
    Settings { settings: HintSettings },
    ResetWeights,
    Toggle { enabled: bool },
}

/// Apply one event to the engine. Invalid settings are logged and dropped.
pub fn apply_event(engine: &mut HintEngine, event: InputEvent, at: Instant) {
    match event {
        InputEvent::Pointer { x, y } => engine.on_pointer(x, y, at),
        InputEvent::Candidates { candidates } => engine.on_candidates(candidates),
        InputEvent::Key { key } => {
            engine.on_key(Key::parse(&key), at);
        }
        InputEvent::BadgeClick { ordinal } => {
            engine.on_badge_click(ordinal, at);
        }
        InputEvent::StrayClick => engine.on_stray_click(),
        InputEvent::Speech(speech) => {
            engine.on_speech(speech, at);
        }
        InputEvent::SpeechUnavailable { reason } => engine.on_speech_unavailable(&reason),
        InputEvent::Settings { settings } => match settings.validate() {
            Ok(()) => engine.apply_settings(settings),
            Err(err) => log::warn!("ignoring invalid settings: {err:#}"),
        },
        InputEvent::ResetWeights => engine.reset_weights(),
        InputEvent::Toggle { enabled } => engine.set_enabled(enabled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_wire_events() {
        let pointer: InputEvent = serde_json::from_str(r#"{"type":"pointer","x":10,"y":20.5}"#).unwrap();
        assert_eq!(pointer, InputEvent::Pointer { x: 10.0, y: 20.5 });

        let speech: InputEvent =
            serde_json::from_str(r#"{"type":"speech","transcript":"two","isFinal":true,"confidence":0.8}"#).unwrap();
        match speech {
            InputEvent::Speech(event) => {
                assert_eq!(event.transcript, "two");
                assert!(event.is_final);
            }
            other => panic!("unexpected {:?}", other),
        }

        let reset: InputEvent = serde_json::from_str(r#"{"type":"resetWeights"}"#).unwrap();
        assert_eq!(reset, InputEvent::ResetWeights);

        let candidates: InputEvent = serde_json::from_str(
            r#"{"type":"candidates","candidates":[{"handle":7,"rect":{"left":0,"top":0,"width":40,"height":20},"text":"Go","kind":"button"}]}"#,
        )
        .unwrap();
        match candidates {
            InputEvent::Candidates { candidates } => assert_eq!(candidates.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_partial_settings_event() {
        let event: InputEvent = serde_json::from_str(r#"{"type":"settings","settings":{"topK":3}}"#).unwrap();
        match event {
            InputEvent::Settings { settings } => {
                assert_eq!(settings.top_k, 3);
                assert_eq!(settings.max_distance, 600.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
