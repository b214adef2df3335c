//! Peer directory module
//!
//! The roster of known peers. The network-event path inserts and removes
//! peers while the interpreter looks them up, so every access goes through
//! the directory's own lock and callers only ever see cloned snapshots.

use crate::error::{ChatError, Result};
use crate::peer::{is_valid_nick, Peer, SessionCode};
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

/// Roster of peers, including the local user
pub struct PeerDirectory {
    /// Peers in the order they joined
    peers: RwLock<Vec<Peer>>,
    /// Session code of the local user
    local_code: SessionCode,
}

impl PeerDirectory {
    /// Create a directory holding only the local user
    pub fn new(mut me: Peer) -> Self {
        me.is_local = true;
        let local_code = me.code;
        info!("Local user {} has session code {}", me.nick, local_code);

        Self {
            peers: RwLock::new(vec![me]),
            local_code,
        }
    }

    /// Session code of the local user
    pub fn local_code(&self) -> SessionCode {
        self.local_code
    }

    /// Whether a peer is the local user
    pub fn is_local(&self, peer: &Peer) -> bool {
        peer.code == self.local_code
    }

    /// Add a remote peer
    pub async fn add(&self, mut peer: Peer) -> Result<()> {
        let mut peers = self.peers.write().await;

        if peers.iter().any(|p| p.code == peer.code) {
            trace!("Peer {} already known, skipping", peer.code);
            return Ok(());
        }

        if peers.iter().any(|p| p.nick == peer.nick) {
            warn!("Refusing peer {}: nick '{}' is taken", peer.code, peer.nick);
            return Err(ChatError::command_error(format!("The nick '{}' is in use by someone else", peer.nick)));
        }

        peer.is_local = false;
        debug!("Added peer {} ({}) (total: {})", peer.nick, peer.code, peers.len() + 1);
        peers.push(peer);

        Ok(())
    }

    /// Remove a remote peer. The local user is never removed.
    pub async fn remove(&self, code: SessionCode) -> Option<Peer> {
        if code == self.local_code {
            warn!("Ignoring request to remove the local user");
            return None;
        }

        let mut peers = self.peers.write().await;
        let index = peers.iter().position(|p| p.code == code)?;
        let peer = peers.remove(index);
        info!("Removed peer {} (remaining: {})", peer.nick, peers.len());

        Some(peer)
    }

    /// Look up a peer by nick
    pub async fn resolve(&self, nick: &str) -> Option<Peer> {
        let peers = self.peers.read().await;
        peers.iter().find(|p| p.nick == nick).cloned()
    }

    /// Look up a peer by session code
    pub async fn get(&self, code: SessionCode) -> Option<Peer> {
        let peers = self.peers.read().await;
        peers.iter().find(|p| p.code == code).cloned()
    }

    /// Whether a peer other than the local user goes by this nick
    pub async fn is_nick_taken(&self, nick: &str) -> bool {
        let peers = self.peers.read().await;
        peers.iter().any(|p| p.code != self.local_code && p.nick == nick)
    }

    /// Snapshot of the local user
    pub async fn local_user(&self) -> Peer {
        let peers = self.peers.read().await;
        peers
            .iter()
            .find(|p| p.code == self.local_code)
            .cloned()
            .unwrap_or_else(|| Peer::local(String::new(), self.local_code))
    }

    /// All peers in directory order
    pub async fn all(&self) -> Vec<Peer> {
        self.peers.read().await.clone()
    }

    /// All peers sorted for display
    pub async fn sorted(&self) -> Vec<Peer> {
        let mut peers = self.all().await;
        peers.sort_by(|a, b| a.display_cmp(b));
        peers
    }

    /// Number of peers, including the local user
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Whether the directory is empty (never true once created)
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    /// Apply a change to one peer and return the updated snapshot
    pub async fn update<F>(&self, code: SessionCode, change: F) -> Option<Peer>
    where
        F: FnOnce(&mut Peer),
    {
        let mut peers = self.peers.write().await;
        let peer = peers.iter_mut().find(|p| p.code == code)?;
        change(peer);
        Some(peer.clone())
    }

    /// Give a peer a new nick, enforcing uniqueness and the naming rule
    pub async fn rename(&self, code: SessionCode, nick: &str) -> Result<Peer> {
        if !is_valid_nick(nick) {
            return Err(ChatError::command_error(format!("'{}' is not a valid nick name. (1-10 letters)", nick)));
        }

        let mut peers = self.peers.write().await;

        if peers.iter().any(|p| p.code != code && p.nick == nick) {
            return Err(ChatError::command_error(format!("'{}' is in use by someone else", nick)));
        }

        let peer = peers
            .iter_mut()
            .find(|p| p.code == code)
            .ok_or_else(|| ChatError::command_error(format!("No such user with code {}", code)))?;

        debug!("Peer {} renamed from {} to {}", code, peer.nick, nick);
        peer.nick = nick.to_string();

        Ok(peer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn directory() -> PeerDirectory {
        PeerDirectory::new(Peer::local("me", SessionCode(1)))
    }

    #[tokio::test]
    async fn test_new_directory_has_local_user() {
        let dir = directory();
        assert_eq!(dir.len().await, 1);

        let me = dir.local_user().await;
        assert_eq!(me.nick, "me");
        assert!(me.is_local);
        assert!(dir.is_local(&me));
    }

    #[tokio::test]
    async fn test_add_and_resolve() {
        let dir = directory();
        dir.add(Peer::new("bob", SessionCode(2))).await.unwrap();

        let bob = dir.resolve("bob").await.unwrap();
        assert_eq!(bob.code, SessionCode(2));
        assert!(!dir.is_local(&bob));
        assert!(dir.resolve("Bob").await.is_none());
    }

    #[tokio::test]
    async fn test_add_cannot_claim_local_flag() {
        let dir = directory();
        let mut imposter = Peer::new("bob", SessionCode(2));
        imposter.is_local = true;
        dir.add(imposter).await.unwrap();

        let locals = dir.all().await.into_iter().filter(|p| p.is_local).count();
        assert_eq!(locals, 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_nick_rejected() {
        let dir = directory();
        dir.add(Peer::new("bob", SessionCode(2))).await.unwrap();
        assert!(dir.add(Peer::new("bob", SessionCode(3))).await.is_err());
        assert_eq!(dir.len().await, 2);
    }

    #[tokio::test]
    async fn test_remove_peer() {
        let dir = directory();
        dir.add(Peer::new("bob", SessionCode(2))).await.unwrap();

        assert!(dir.remove(SessionCode(2)).await.is_some());
        assert!(dir.resolve("bob").await.is_none());
        assert!(dir.remove(SessionCode(1)).await.is_none());
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn test_is_nick_taken_ignores_local_user() {
        let dir = directory();
        dir.add(Peer::new("bob", SessionCode(2))).await.unwrap();

        assert!(dir.is_nick_taken("bob").await);
        assert!(!dir.is_nick_taken("me").await);
        assert!(!dir.is_nick_taken("carol").await);
    }

    #[tokio::test]
    async fn test_all_keeps_insertion_order() {
        let dir = directory();
        dir.add(Peer::new("Alice", SessionCode(2))).await.unwrap();
        dir.add(Peer::new("bob", SessionCode(3))).await.unwrap();
        dir.add(Peer::new("Carol", SessionCode(4))).await.unwrap();

        let nicks: Vec<String> = dir.all().await.into_iter().map(|p| p.nick).collect();
        assert_eq!(nicks, vec!["me", "Alice", "bob", "Carol"]);

        let sorted: Vec<String> = dir.sorted().await.into_iter().map(|p| p.nick).collect();
        assert_eq!(sorted, vec!["Alice", "bob", "Carol", "me"]);
    }

    #[tokio::test]
    async fn test_rename() {
        let dir = directory();
        dir.add(Peer::new("bob", SessionCode(2))).await.unwrap();

        assert!(dir.rename(SessionCode(1), "bob").await.is_err());
        assert!(dir.rename(SessionCode(1), "not valid").await.is_err());

        let me = dir.rename(SessionCode(1), "kou").await.unwrap();
        assert_eq!(me.nick, "kou");
        assert_eq!(dir.local_user().await.nick, "kou");
    }

    #[tokio::test]
    async fn test_update() {
        let dir = directory();
        dir.add(Peer::new("bob", SessionCode(2))).await.unwrap();

        let bob = dir.update(SessionCode(2), |p| p.go_away("gone")).await.unwrap();
        assert!(bob.away);
        assert!(dir.update(SessionCode(9), |p| p.writing = true).await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_insert_during_lookup() {
        let dir = Arc::new(directory());

        let writer = {
            let dir = dir.clone();
            tokio::spawn(async move {
                for i in 0..200u32 {
                    let nick: String = std::iter::repeat('a').take(1 + (i % 10) as usize).collect();
                    let nick = format!("{}{}", nick, char::from(b'a' + (i / 10) as u8));
                    let _ = dir.add(Peer::new(nick, SessionCode(100 + i))).await;
                }
            })
        };

        let reader = {
            let dir = dir.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let snapshot = dir.all().await;
                    assert!(snapshot.iter().any(|p| p.is_local));
                    assert!(dir.resolve("me").await.is_some());
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();

        assert!(dir.len().await > 1);
        assert_eq!(dir.local_user().await.nick, "me");
    }
}
