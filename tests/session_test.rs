use glam::Vec3;
use tinyjson::JsonValue;
use wibble::{
    ConfigurationError, InboundState, Node, Optics, OutboundState, Scene, Session, TransportError,
};

use crate::common::{material, triangle, Call, RecordingContext, ScriptedTransport};

mod common;

fn session() -> Session<RecordingContext, ScriptedTransport> {
    let mut scene = Scene::new(RecordingContext::new());
    let components = vec![triangle(&mut scene)];
    let material = material(&mut scene);
    let optics = Optics::new(45.0, 0.1, 1000.0).unwrap();
    let camera = scene.insert("camera", Node::camera(optics).translated(Vec3::new(0.0, 0.0, 5.0)));
    scene.insert("molecule", Node::drawable(components, material));
    scene.set_active_camera(camera).unwrap();
    Session::new(scene, ScriptedTransport::default(), "/data")
}

#[test]
fn sends_pressed_keys_every_frame() {
    let mut session = session();
    session.frame().unwrap();
    session.scene_mut().key_down(65);
    session.frame().unwrap();
    session.scene_mut().key_up(65);
    session.frame().unwrap();

    let sent = &session.transport().sent;
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|(path, _)| path == "/data"));
    assert_eq!(sent[0].1, "{}");
    let second = OutboundState::from_json(&sent[1].1).unwrap();
    assert_eq!(second.get("key65"), Some(true));
    assert_eq!(sent[2].1, "{}");
}

#[test]
fn responses_become_inbound_state() {
    let mut session = session();
    session.frame().unwrap();
    assert_eq!(session.scene().inbound().value(), &JsonValue::Null);

    session_responses(&mut session, vec![Ok(r#"{"frame": 1}"#.to_string())]);
    session.frame().unwrap();
    assert_eq!(
        session.scene().inbound().get("frame"),
        Some(&JsonValue::Number(1.0))
    );

    // No news keeps the last state around.
    session.frame().unwrap();
    assert_eq!(
        session.scene().inbound().get("frame"),
        Some(&JsonValue::Number(1.0))
    );
}

#[test]
fn the_newest_response_wins() {
    let mut session = session();
    session_responses(
        &mut session,
        vec![
            Ok(r#"{"frame": 1}"#.to_string()),
            Ok(r#"{"frame": 2}"#.to_string()),
        ],
    );
    session.frame().unwrap();
    assert_eq!(
        session.scene().inbound().get("frame"),
        Some(&JsonValue::Number(2.0))
    );
}

#[test]
fn transport_failures_do_not_stop_frames() {
    let mut session = session();
    session_responses(&mut session, vec![Ok(r#"{"frame": 1}"#.to_string())]);
    session.frame().unwrap();

    session_responses(
        &mut session,
        vec![
            Ok("{broken".to_string()),
            Err(TransportError::Status(500)),
            Err(TransportError::Request("connection refused".to_string())),
        ],
    );
    session.frame().unwrap();
    assert_eq!(
        session.scene().inbound().get("frame"),
        Some(&JsonValue::Number(1.0))
    );
    assert_eq!(session.transport().sent.len(), 2);
    assert_eq!(session.scene().context().draw_count(), 2);
}

#[test]
fn unrenderable_scene_sends_nothing() {
    let mut session = session();
    let camera = session.scene().get("camera").unwrap();
    session.scene_mut().remove(camera);
    assert_eq!(session.frame(), Err(ConfigurationError::NoActiveCamera));
    assert!(session.transport().sent.is_empty());
}

#[test]
fn frames_without_news_keep_the_scene_inbound_state() {
    let mut session = session();
    let inbound = InboundState::from_json(r#"{"level": "two"}"#).unwrap();
    session.scene_mut().render(inbound).unwrap();

    session.frame().unwrap();
    assert_eq!(
        session.scene().inbound().get("level"),
        Some(&JsonValue::String("two".to_string()))
    );
}

#[test]
fn dropping_the_session_releases_scene_resources() {
    let session = session();
    let released = session.scene().context().released.clone();
    drop(session);

    let released = released.borrow();
    assert_eq!(
        released
            .iter()
            .filter(|call| matches!(call, Call::DeleteBuffer(_)))
            .count(),
        2
    );
    assert_eq!(
        released
            .iter()
            .filter(|call| matches!(call, Call::DeleteProgram(_)))
            .count(),
        1
    );
}

fn session_responses(
    session: &mut Session<RecordingContext, ScriptedTransport>,
    responses: Vec<Result<String, TransportError>>,
) {
    session.transport_mut().responses.extend(responses);
}
