use super::*;
use crate::component::ComponentKind::{self, Chart, Count, Table, Text};
use crate::list::ComponentDescriptor;
use crate::gateway::parse_story;
use crate::test_helpers::rebuild_story;
use serde_json::{Value, json};
use std::sync::Mutex as StdMutex;

// =========================================================================
// MockGateway
// =========================================================================

enum Reply {
    /// Answer with the story the server rebuilds from the posted form.
    Echo,
    Status(u16),
    Story(StoryState),
}

struct MockGateway {
    replies: StdMutex<Vec<Reply>>,
    saved: StdMutex<Vec<FormState>>,
}

impl MockGateway {
    fn echo() -> Self {
        Self::scripted(Vec::new())
    }

    /// Replies are consumed in order; `Echo` once exhausted.
    fn scripted(replies: Vec<Reply>) -> Self {
        Self { replies: StdMutex::new(replies), saved: StdMutex::new(Vec::new()) }
    }

    fn saved(&self) -> Vec<FormState> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for MockGateway {
    async fn save(&self, form: &FormState) -> Result<StoryState, EditorError> {
        self.saved.lock().unwrap().push(form.clone());
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() { Reply::Echo } else { replies.remove(0) }
        };
        match reply {
            Reply::Echo => parse_story(&rebuild_story(form.pairs()).to_string()),
            Reply::Status(status) => Err(EditorError::ApiResponse { status, body: String::new() }),
            Reply::Story(story) => Ok(story),
        }
    }
}

fn story_of(kinds: &[ComponentKind]) -> StoryState {
    let elements: Vec<Value> = kinds
        .iter()
        .enumerate()
        .map(|(i, k)| json!({"type": k.name(), "position": i, "label": format!("{}-{i}", k.name())}))
        .collect();
    serde_json::from_value(json!({"title": "Museum Visits", "dynamic_elements": elements})).unwrap()
}

fn editor(kinds: &[ComponentKind]) -> StoryEditor<MockGateway> {
    StoryEditor::new(story_of(kinds), EditMode::Modify, MockGateway::echo())
}

fn descriptors(editor: &StoryEditor<MockGateway>) -> Vec<(ComponentKind, usize)> {
    editor.list().as_slice().iter().map(|d| (d.kind, d.position)).collect()
}

fn story_positions(editor: &StoryEditor<MockGateway>) -> Vec<(String, usize)> {
    editor
        .story()
        .dynamic_elements
        .iter()
        .map(|el| (el.kind.clone(), el.position))
        .collect()
}

// =========================================================================
// load
// =========================================================================

#[test]
fn new_builds_list_from_story_and_skips_unknown_types() {
    let story: StoryState = serde_json::from_value(json!({
        "dynamic_elements": [
            {"type": "text", "position": 0},
            {"type": "textsearch", "position": 1},
            {"type": "chart", "position": 2}
        ]
    }))
    .unwrap();

    let editor = StoryEditor::new(story, EditMode::Modify, MockGateway::echo());

    assert_eq!(descriptors(&editor), [(Text, 0), (Chart, 1)]);
    assert_eq!(editor.story().dynamic_elements.len(), 2);
    assert_eq!(editor.sync_count(), 0);
}

// =========================================================================
// add
// =========================================================================

#[tokio::test]
async fn add_chart_appends_and_syncs_once() {
    let mut editor = editor(&[Text]);

    let outcome = editor.add("chart").await.unwrap();

    assert_eq!(outcome, SyncOutcome::Synced);
    assert_eq!(
        editor.list().as_slice(),
        [ComponentDescriptor { kind: Text, position: 0 }, ComponentDescriptor { kind: Chart, position: 1 }]
    );
    assert_eq!(editor.sync_count(), 1);
    let saved = editor.gateway.saved();
    assert_eq!(saved[0].get("1__chart"), Some(""));
    assert_eq!(story_positions(&editor), [("text".to_owned(), 0), ("chart".to_owned(), 1)]);
}

#[tokio::test]
async fn add_unknown_type_is_a_silent_noop() {
    let mut editor = editor(&[Text, Count]);

    let outcome = editor.add("unknown_type").await.unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped);
    assert_eq!(descriptors(&editor), [(Text, 0), (Count, 1)]);
    assert_eq!(editor.sync_count(), 0);
}

// =========================================================================
// remove
// =========================================================================

#[tokio::test]
async fn remove_middle_renumbers_and_syncs_once() {
    let mut editor = editor(&[Text, Count, Chart]);

    let outcome = editor.remove(1).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Synced);
    assert_eq!(descriptors(&editor), [(Text, 0), (Chart, 1)]);
    assert_eq!(story_positions(&editor), [("text".to_owned(), 0), ("chart".to_owned(), 1)]);
    assert_eq!(editor.sync_count(), 1);

    let form = &editor.gateway.saved()[0];
    assert_eq!(form.get("1__chart"), Some(""));
    assert_eq!(form.get("1__label"), Some("chart-2"));
    assert!(form.pairs().iter().all(|(k, _)| !k.starts_with("2__")));
}

#[tokio::test]
async fn remove_out_of_range_fails_without_sync() {
    let mut editor = editor(&[Text]);

    let err = editor.remove(3).await.unwrap_err();

    assert!(matches!(err, EditorError::IndexOutOfRange { index: 3, len: 1 }));
    assert_eq!(editor.sync_count(), 0);
    assert_eq!(descriptors(&editor), [(Text, 0)]);
}

#[tokio::test]
async fn remove_last_remaining_component_empties_story() {
    let mut editor = editor(&[Table]);
    editor.remove(0).await.unwrap();
    assert!(editor.list().is_empty());
    assert!(editor.story().dynamic_elements.is_empty());
}

// =========================================================================
// move_up / move_down
// =========================================================================

#[tokio::test]
async fn move_up_carries_payload_with_component() {
    let mut editor = editor(&[Text, Count, Chart]);

    editor.move_up(2).await.unwrap();

    assert_eq!(descriptors(&editor), [(Text, 0), (Chart, 1), (Count, 2)]);
    let form = &editor.gateway.saved()[0];
    assert_eq!(form.get("1__label"), Some("chart-2"));
    assert_eq!(form.get("2__label"), Some("count-1"));
}

#[tokio::test]
async fn move_up_at_front_is_identity_but_still_syncs() {
    let mut editor = editor(&[Text, Count]);

    let outcome = editor.move_up(0).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Synced);
    assert_eq!(descriptors(&editor), [(Text, 0), (Count, 1)]);
    assert_eq!(editor.sync_count(), 1);
}

#[tokio::test]
async fn move_down_at_end_is_identity_but_still_syncs() {
    let mut editor = editor(&[Text, Count, Chart]);

    let outcome = editor.move_down(2).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Synced);
    assert_eq!(descriptors(&editor), [(Text, 0), (Count, 1), (Chart, 2)]);
    assert_eq!(editor.sync_count(), 1);
}

#[tokio::test]
async fn move_down_swaps_with_next() {
    let mut editor = editor(&[Text, Count, Chart]);
    editor.move_down(0).await.unwrap();
    assert_eq!(descriptors(&editor), [(Count, 0), (Text, 1), (Chart, 2)]);
    assert_eq!(
        story_positions(&editor),
        [("count".to_owned(), 0), ("text".to_owned(), 1), ("chart".to_owned(), 2)]
    );
}

#[tokio::test]
async fn moves_reject_out_of_range_without_sync() {
    let mut editor = editor(&[Text, Count]);
    assert!(matches!(editor.move_up(2).await, Err(EditorError::IndexOutOfRange { .. })));
    assert!(matches!(editor.move_down(2).await, Err(EditorError::IndexOutOfRange { .. })));
    assert_eq!(editor.sync_count(), 0);
}

// =========================================================================
// read-only pages
// =========================================================================

#[tokio::test]
async fn view_mode_rejects_edits_and_skips_pointer_leave() {
    let mut editor = StoryEditor::new(story_of(&[Text]), EditMode::View, MockGateway::echo());

    assert!(matches!(editor.add("chart").await, Err(EditorError::ReadOnly)));
    assert!(matches!(editor.remove(0).await, Err(EditorError::ReadOnly)));
    assert_eq!(editor.pointer_leave().await, SyncOutcome::Skipped);
    assert!(editor.palette().is_empty());
    assert_eq!(editor.sync_count(), 0);
}

#[test]
fn modify_mode_exposes_full_palette() {
    let editor = editor(&[]);
    let names: Vec<&str> = editor.palette().iter().map(|e| e.name).collect();
    assert_eq!(names, ["text", "count", "chart", "table"]);
}

// =========================================================================
// sync outcomes
// =========================================================================

#[tokio::test]
async fn failed_sync_keeps_local_edit() {
    let gateway = MockGateway::scripted(vec![Reply::Status(503)]);
    let mut editor = StoryEditor::new(story_of(&[Text, Count]), EditMode::Modify, gateway);

    let outcome = editor.remove(0).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Failed { code: "E_API_RESPONSE", .. }));
    assert_eq!(descriptors(&editor), [(Count, 0)]);
    assert_eq!(story_positions(&editor), [("count".to_owned(), 0)]);

    // The next save carries the edit.
    assert_eq!(editor.pointer_leave().await, SyncOutcome::Synced);
    assert_eq!(editor.gateway.saved()[1].get("0__count"), Some(""));
}

#[tokio::test]
async fn diverged_response_is_not_adopted() {
    let gateway = MockGateway::scripted(vec![Reply::Story(StoryState::default())]);
    let mut editor = StoryEditor::new(story_of(&[Text]), EditMode::Modify, gateway);

    let outcome = editor.add("table").await.unwrap();

    assert_eq!(outcome, SyncOutcome::Diverged { local: 2, remote: 0 });
    assert_eq!(story_positions(&editor), [("text".to_owned(), 0), ("table".to_owned(), 1)]);
    assert_eq!(editor.story().title.as_deref(), Some("Museum Visits"));
}

#[tokio::test]
async fn last_response_wins() {
    let first = StoryState { title: Some("first".into()), ..story_of(&[Text]) };
    let second = StoryState { title: Some("second".into()), ..story_of(&[Text]) };
    let gateway = MockGateway::scripted(vec![Reply::Story(first), Reply::Story(second)]);
    let mut editor = StoryEditor::new(story_of(&[Text]), EditMode::Modify, gateway);

    editor.pointer_leave().await;
    editor.pointer_leave().await;

    assert_eq!(editor.story().title.as_deref(), Some("second"));
    assert_eq!(editor.sync_count(), 2);
}

#[tokio::test]
async fn adopted_response_positions_are_renumbered() {
    let remote: StoryState = serde_json::from_value(json!({
        "dynamic_elements": [{"type": "text", "position": 7}, {"type": "chart", "position": 7}]
    }))
    .unwrap();
    let gateway = MockGateway::scripted(vec![Reply::Story(remote)]);
    let mut editor = StoryEditor::new(story_of(&[Text, Chart]), EditMode::Modify, gateway);

    assert_eq!(editor.sync().await, SyncOutcome::Synced);
    assert_eq!(story_positions(&editor), [("text".to_owned(), 0), ("chart".to_owned(), 1)]);
}

// =========================================================================
// shared editor
// =========================================================================

#[tokio::test]
async fn spawned_pointer_leave_syncs_shared_editor() {
    let shared: SharedEditor<MockGateway> = Arc::new(Mutex::new(editor(&[Text, Chart])));

    let first = spawn_pointer_leave(shared.clone());
    let second = spawn_pointer_leave(shared.clone());

    assert_eq!(first.await.unwrap(), SyncOutcome::Synced);
    assert_eq!(second.await.unwrap(), SyncOutcome::Synced);
    assert_eq!(shared.lock().await.sync_count(), 2);
}

// =========================================================================
// server form rules
// =========================================================================

#[tokio::test]
async fn added_table_stays_in_sync_although_server_omits_its_type() {
    let story: StoryState =
        serde_json::from_value(json!({"dynamic_elements": [{"type": "text", "position": 0, "text": "hi"}]})).unwrap();
    let mut editor = StoryEditor::new(story, EditMode::Modify, MockGateway::echo());

    assert_eq!(editor.add("table").await.unwrap(), SyncOutcome::Synced);
    assert_eq!(editor.pointer_leave().await, SyncOutcome::Synced);

    assert_eq!(story_positions(&editor), [("text".to_owned(), 0), ("table".to_owned(), 1)]);
    assert_eq!(editor.story().dynamic_elements[0].payload.get("text"), Some(&json!("hi")));
}

#[tokio::test]
async fn freshly_added_components_come_back_typed() {
    let mut editor = editor(&[]);

    for kind in ["text", "count", "chart"] {
        assert_eq!(editor.add(kind).await.unwrap(), SyncOutcome::Synced);
    }

    assert_eq!(
        story_positions(&editor),
        [("text".to_owned(), 0), ("count".to_owned(), 1), ("chart".to_owned(), 2)]
    );
}

#[tokio::test]
async fn operations_survive_repeated_syncs() {
    let story: StoryState = serde_json::from_value(json!({
        "dynamic_elements": [{"type": "count", "position": 0, "count_query": "SELECT 1",
                              "operations": [{"action": "count", "param": "label"}]}]
    }))
    .unwrap();
    let mut editor = StoryEditor::new(story, EditMode::Modify, MockGateway::echo());

    editor.pointer_leave().await;
    editor.pointer_leave().await;

    let el = &editor.story().dynamic_elements[0];
    assert_eq!(el.kind, "count");
    assert_eq!(el.payload.get("count_query"), Some(&json!("SELECT 1")));
    assert_eq!(el.payload.get("operations"), Some(&json!([{"action": "count", "param": "label"}])));
}
