#![allow(clippy::float_cmp)]

use canvas::NoteColor;
use uuid::Uuid;

use super::*;

fn note(title: &str) -> Note {
    Note {
        id: Uuid::new_v4(),
        title: title.into(),
        content: "body".into(),
        owner_id: None,
        x: 0.0,
        y: 0.0,
        width: 250.0,
        height: 200.0,
        color: NoteColor::Blue,
        tags: Vec::new(),
        created_at: 0,
        updated_at: 0,
    }
}

fn edge(a: NoteId, b: NoteId) -> Connection {
    Connection { id: Uuid::new_v4(), from_note_id: a, to_note_id: b }
}

#[tokio::test]
async fn notes_come_back_in_creation_order() {
    let repo = MemoryNoteRepo::new();
    for title in ["first", "second", "third"] {
        repo.create(&note(title)).await.unwrap();
    }
    let titles: Vec<String> = repo.get_all().await.unwrap().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, ["first", "second", "third"]);
}

#[tokio::test]
async fn get_by_id_and_update() {
    let repo = MemoryNoteRepo::new();
    let n = note("a");
    let id = repo.create(&n).await.unwrap();
    assert_eq!(id, n.id);

    repo.update(id, NoteUpdate::position(40.0, 50.0, 3)).await.unwrap();
    let stored = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!((stored.x, stored.y, stored.updated_at), (40.0, 50.0, 3));
    assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_missing_note_is_not_found() {
    let repo = MemoryNoteRepo::new();
    let id = Uuid::new_v4();
    let err = repo.update(id, NoteUpdate::position(0.0, 0.0, 1)).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let repo = MemoryNoteRepo::new();
    let id = repo.create(&note("a")).await.unwrap();
    repo.delete(id).await.unwrap();
    repo.delete(id).await.unwrap();
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn clones_share_storage() {
    let repo = MemoryNoteRepo::new();
    let other = repo.clone();
    repo.create(&note("shared")).await.unwrap();
    assert_eq!(other.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failure_switch_blocks_writes_only() {
    let repo = MemoryNoteRepo::new();
    let id = repo.create(&note("kept")).await.unwrap();
    repo.set_fail_writes(true);

    assert!(matches!(repo.create(&note("lost")).await, Err(RepoError::Unavailable(_))));
    assert!(matches!(repo.update(id, NoteUpdate::position(1.0, 1.0, 1)).await, Err(RepoError::Unavailable(_))));
    assert!(matches!(repo.delete(id).await, Err(RepoError::Unavailable(_))));
    assert_eq!(repo.get_all().await.unwrap().len(), 1);

    repo.set_fail_writes(false);
    repo.delete(id).await.unwrap();
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_by_note_id_removes_both_directions() {
    let repo = MemoryConnectionRepo::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    repo.create(&edge(a, b)).await.unwrap();
    repo.create(&edge(c, a)).await.unwrap();
    let keep = edge(b, c);
    repo.create(&keep).await.unwrap();

    assert_eq!(repo.delete_by_note_id(a).await.unwrap(), 2);
    assert_eq!(repo.get_all().await.unwrap(), vec![keep]);
    assert_eq!(repo.delete_by_note_id(a).await.unwrap(), 0);
}

#[tokio::test]
async fn connection_create_and_delete() {
    let repo = MemoryConnectionRepo::new();
    let e = edge(Uuid::new_v4(), Uuid::new_v4());
    assert_eq!(repo.create(&e).await.unwrap(), e.id);
    repo.create(&e).await.unwrap();
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
    repo.delete(e.id).await.unwrap();
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn connection_failure_switch() {
    let repo = MemoryConnectionRepo::new();
    repo.set_fail_writes(true);
    let e = edge(Uuid::new_v4(), Uuid::new_v4());
    assert!(matches!(repo.create(&e).await, Err(RepoError::Unavailable(_))));
    assert!(matches!(repo.delete_by_note_id(e.from_note_id).await, Err(RepoError::Unavailable(_))));
    assert!(repo.get_all().await.unwrap().is_empty());
}
