//! Song ordering inside a playlist.
//!
//! The order is applied locally first and persisted with a single
//! `PUT /playlists/{id}` carrying the full `songIds` list. What happens to
//! the local order when persisting fails is a [`ReorderPolicy`] decision.

use async_trait::async_trait;

use crate::cli::error::CliError;
use crate::cli::kantik_client::KantikClient;
use crate::models::{PlaylistDetail, PlaylistUpdate};

/// Move the element at `from` to `to`, shifting the ones in between.
///
/// Out-of-range indices and `from == to` leave the slice unchanged.
/// Returns whether anything moved.
pub fn move_song<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// What to do with the local order when the server rejects it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReorderPolicy {
    /// Keep the optimistic order and report the error.
    #[default]
    BestEffort,
    /// Reload the playlist from the server, then report the error.
    Reconcile,
}

/// Playlist persistence used by [`PlaylistEditor`].
#[async_trait]
pub trait PlaylistStore {
    async fn load(&self, playlist_id: &str) -> Result<PlaylistDetail, CliError>;
    async fn save_order(&self, playlist_id: &str, song_ids: &[String]) -> Result<(), CliError>;
    async fn remove(&self, playlist_id: &str, song_id: &str) -> Result<(), CliError>;
}

#[async_trait]
impl PlaylistStore for KantikClient {
    async fn load(&self, playlist_id: &str) -> Result<PlaylistDetail, CliError> {
        self.get_playlist(playlist_id).await
    }

    async fn save_order(&self, playlist_id: &str, song_ids: &[String]) -> Result<(), CliError> {
        let update = PlaylistUpdate {
            name: None,
            song_ids: Some(song_ids.to_vec()),
        };
        self.update_playlist(playlist_id, &update).await
    }

    async fn remove(&self, playlist_id: &str, song_id: &str) -> Result<(), CliError> {
        self.remove_playlist_song(playlist_id, song_id).await
    }
}

/// Local copy of one playlist plus the operations that change it.
pub struct PlaylistEditor<'a, P: PlaylistStore + Sync> {
    store: &'a P,
    detail: PlaylistDetail,
    policy: ReorderPolicy,
}

impl<'a, P: PlaylistStore + Sync> PlaylistEditor<'a, P> {
    pub async fn open(
        store: &'a P,
        playlist_id: &str,
        policy: ReorderPolicy,
    ) -> Result<Self, CliError> {
        let detail = store.load(playlist_id).await?;
        Ok(Self {
            store,
            detail,
            policy,
        })
    }

    pub fn detail(&self) -> &PlaylistDetail {
        &self.detail
    }

    pub fn song_ids(&self) -> &[String] {
        &self.detail.playlist.song_ids
    }

    /// Place `song_id` at the position currently held by `target_song_id`.
    ///
    /// Unknown ids or a drop onto itself are no-ops and send nothing.
    #[tracing::instrument(name = "Reorder playlist", skip(self), fields(playlist = %self.detail.playlist.id))]
    pub async fn reorder(&mut self, song_id: &str, target_song_id: &str) -> Result<bool, CliError> {
        let ids = &self.detail.playlist.song_ids;
        let (Some(from), Some(to)) = (
            ids.iter().position(|id| id == song_id),
            ids.iter().position(|id| id == target_song_id),
        ) else {
            return Ok(false);
        };

        self.move_to(from, to).await
    }

    /// Move by position. Out-of-range positions are no-ops.
    pub async fn move_to(&mut self, from: usize, to: usize) -> Result<bool, CliError> {
        if !move_song(&mut self.detail.playlist.song_ids, from, to) {
            return Ok(false);
        }
        self.align_songs();

        let playlist_id = self.detail.playlist.id.clone();
        match self
            .store
            .save_order(&playlist_id, &self.detail.playlist.song_ids)
            .await
        {
            Ok(()) => Ok(true),
            Err(err) => {
                tracing::warn!(error = %err, policy = ?self.policy, "saving playlist order failed");
                if self.policy == ReorderPolicy::Reconcile {
                    match self.store.load(&playlist_id).await {
                        Ok(fresh) => self.detail = fresh,
                        Err(reload) => {
                            tracing::error!(error = %reload, "reloading playlist failed");
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Remove a song once the server has acknowledged it.
    pub async fn remove_song(&mut self, song_id: &str) -> Result<(), CliError> {
        self.store
            .remove(&self.detail.playlist.id, song_id)
            .await?;
        self.detail.playlist.song_ids.retain(|id| id != song_id);
        self.detail.songs.retain(|song| song.id != song_id);
        Ok(())
    }

    /// Reorder the embedded songs to follow `song_ids`.
    fn align_songs(&mut self) {
        let ids = &self.detail.playlist.song_ids;
        self.detail.songs.sort_by_key(|song| {
            ids.iter()
                .position(|id| *id == song.id)
                .unwrap_or(usize::MAX)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Playlist, Song};
    use std::sync::Mutex;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_move_song_forward_and_back() {
        let mut list = ids(&["a", "b", "c", "d"]);
        assert!(move_song(&mut list, 0, 2));
        assert_eq!(list, ids(&["b", "c", "a", "d"]));
        assert!(move_song(&mut list, 3, 0));
        assert_eq!(list, ids(&["d", "b", "c", "a"]));
    }

    #[test]
    fn test_move_song_noops() {
        let mut list = ids(&["a", "b", "c"]);
        assert!(!move_song(&mut list, 1, 1));
        assert!(!move_song(&mut list, 5, 0));
        assert!(!move_song(&mut list, 0, 3));
        assert_eq!(list, ids(&["a", "b", "c"]));
    }

    // ── In-memory mock store ────────────────────────

    struct MockStore {
        server: Mutex<Vec<String>>,
        fail_save: bool,
        saves: Mutex<Vec<Vec<String>>>,
    }

    impl MockStore {
        fn new(order: &[&str], fail_save: bool) -> Self {
            Self {
                server: Mutex::new(ids(order)),
                fail_save,
                saves: Mutex::new(Vec::new()),
            }
        }
    }

    fn song(id: &str) -> Song {
        serde_json::from_value(serde_json::json!({"id": id, "number": 1, "title": id})).unwrap()
    }

    #[async_trait]
    impl PlaylistStore for MockStore {
        async fn load(&self, playlist_id: &str) -> Result<PlaylistDetail, CliError> {
            let order = self.server.lock().unwrap().clone();
            Ok(PlaylistDetail {
                songs: order.iter().map(|id| song(id)).collect(),
                playlist: Playlist {
                    id: playlist_id.to_string(),
                    name: "Sunday".into(),
                    owner_type: Default::default(),
                    owner_id: "u1".into(),
                    song_ids: order,
                    created_at: None,
                    updated_at: None,
                },
            })
        }

        async fn save_order(&self, _: &str, song_ids: &[String]) -> Result<(), CliError> {
            self.saves.lock().unwrap().push(song_ids.to_vec());
            if self.fail_save {
                return Err(CliError::Network("connection reset".into()));
            }
            *self.server.lock().unwrap() = song_ids.to_vec();
            Ok(())
        }

        async fn remove(&self, _: &str, song_id: &str) -> Result<(), CliError> {
            if self.fail_save {
                return Err(CliError::Network("connection reset".into()));
            }
            self.server.lock().unwrap().retain(|id| id != song_id);
            Ok(())
        }
    }

    fn song_order(editor: &PlaylistEditor<'_, MockStore>) -> Vec<String> {
        editor.detail().songs.iter().map(|s| s.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_reorder_persists_once() {
        let store = MockStore::new(&["a", "b", "c"], false);
        let mut editor = PlaylistEditor::open(&store, "p1", ReorderPolicy::BestEffort)
            .await
            .unwrap();

        assert!(editor.reorder("c", "a").await.unwrap());
        assert_eq!(editor.song_ids(), ids(&["c", "a", "b"]).as_slice());
        assert_eq!(song_order(&editor), ids(&["c", "a", "b"]));
        assert_eq!(store.saves.lock().unwrap().len(), 1);
        assert_eq!(*store.server.lock().unwrap(), ids(&["c", "a", "b"]));
    }

    #[tokio::test]
    async fn test_reorder_unknown_song_sends_nothing() {
        let store = MockStore::new(&["a", "b"], false);
        let mut editor = PlaylistEditor::open(&store, "p1", ReorderPolicy::BestEffort)
            .await
            .unwrap();
        assert!(!editor.reorder("zz", "a").await.unwrap());
        assert!(!editor.reorder("a", "a").await.unwrap());
        assert!(store.saves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_best_effort_keeps_optimistic_order_on_failure() {
        let store = MockStore::new(&["a", "b", "c"], true);
        let mut editor = PlaylistEditor::open(&store, "p1", ReorderPolicy::BestEffort)
            .await
            .unwrap();

        let err = editor.reorder("a", "c").await.unwrap_err();
        assert!(matches!(err, CliError::Network(_)));
        assert_eq!(editor.song_ids(), ids(&["b", "c", "a"]).as_slice());
        assert_eq!(*store.server.lock().unwrap(), ids(&["a", "b", "c"]));
        assert_eq!(store.saves.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_restores_server_order_on_failure() {
        let store = MockStore::new(&["a", "b", "c"], true);
        let mut editor = PlaylistEditor::open(&store, "p1", ReorderPolicy::Reconcile)
            .await
            .unwrap();

        assert!(editor.reorder("a", "c").await.is_err());
        assert_eq!(editor.song_ids(), ids(&["a", "b", "c"]).as_slice());
        assert_eq!(song_order(&editor), ids(&["a", "b", "c"]));
        assert_eq!(store.saves.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_song_waits_for_server() {
        let store = MockStore::new(&["a", "b"], true);
        let mut editor = PlaylistEditor::open(&store, "p1", ReorderPolicy::BestEffort)
            .await
            .unwrap();
        assert!(editor.remove_song("a").await.is_err());
        assert_eq!(editor.song_ids(), ids(&["a", "b"]).as_slice());

        let store = MockStore::new(&["a", "b"], false);
        let mut editor = PlaylistEditor::open(&store, "p1", ReorderPolicy::BestEffort)
            .await
            .unwrap();
        editor.remove_song("a").await.unwrap();
        assert_eq!(editor.song_ids(), ids(&["b"]).as_slice());
        assert_eq!(song_order(&editor), ids(&["b"]));
    }
}
