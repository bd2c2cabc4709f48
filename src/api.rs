//! Service-facing entry point.
//!
//! [`SocialCore`] wires the directory, the friend graph, and the feed
//! together the way the surrounding HTTP service consumes them. Caller
//! identity arrives as an already-resolved [`UserId`]; the core never
//! sees credentials. There is no process-wide state: every handle lives
//! on the instance, and tests construct as many independent instances as
//! they like.
//!
//! Engagement mutations go through the visibility check here: a caller
//! may only like or comment on a post they can read, and an invisible
//! post reports plain "not found".

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::directory::{self, DirectoryError, User, UserDirectory, UserId};
use crate::feed::{
    self, Comment, CommentId, EngagementTracker, FeedError, FeedService, Post, PostId,
    PostPrivacy, PostStore,
};
use crate::graph::{self, FriendGraph, GraphError, Profile, ProfileStore};

/// Error opening the core's backing stores.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The data directory could not be created.
    #[error("Failed to create data directory: {0}")]
    DataDir(#[from] std::io::Error),

    /// Directory store failed to open.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Graph store failed to open.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Feed store failed to open.
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Core interface for Trellis functionality.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use trellis_core::SocialCore;
///
/// let core = SocialCore::open(Path::new("/data/trellis"))?;
/// let alice = core.register_user("Alice", "alice@example.com", None)?;
/// ```
pub struct SocialCore {
    directory: Arc<UserDirectory>,
    graph: Arc<FriendGraph>,
    feed: FeedService,
    engagement: EngagementTracker,
}

impl SocialCore {
    /// Assembles a core from already-opened stores.
    #[must_use]
    pub fn new(directory: UserDirectory, profiles: ProfileStore, posts: PostStore) -> Self {
        let directory = Arc::new(directory);
        let graph = Arc::new(FriendGraph::new(Arc::clone(&directory), profiles));
        let posts = Arc::new(posts);
        let feed = FeedService::new(Arc::clone(&graph), Arc::clone(&posts));
        let engagement = EngagementTracker::new(posts);

        Self {
            directory,
            graph,
            feed,
            engagement,
        }
    }

    /// Opens (or creates) the core's stores under a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or any store
    /// fails to open.
    pub fn open(data_dir: &Path) -> Result<Self, CoreError> {
        std::fs::create_dir_all(data_dir)?;

        let directory = UserDirectory::new(&data_dir.join("users.db"))?;
        let profiles = ProfileStore::new(&data_dir.join("graph.db"))?;
        let posts = PostStore::new(&data_dir.join("feed.db"))?;

        Ok(Self::new(directory, profiles, posts))
    }

    /// Creates a core over in-memory stores for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if a store fails to initialize.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self, CoreError> {
        Ok(Self::new(
            UserDirectory::in_memory()?,
            ProfileStore::in_memory()?,
            PostStore::in_memory()?,
        ))
    }

    // ==================== Identity ====================

    /// Registers a new user in the directory.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EmailInUse`] if the email is taken.
    pub fn register_user(
        &self,
        name: &str,
        email: &str,
        avatar: Option<&str>,
    ) -> directory::Result<User> {
        self.directory.add_user(name, email, avatar)
    }

    /// Resolves a user record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lookup fails.
    pub fn user(&self, id: UserId) -> directory::Result<Option<User>> {
        self.directory.user_by_id(id)
    }

    // ==================== Friend Graph ====================

    /// Sends a friend request to the user behind `email` and returns the
    /// target's updated profile.
    ///
    /// # Errors
    ///
    /// See [`FriendGraph::send_request`].
    pub fn send_friend_request(&self, caller: UserId, email: &str) -> graph::Result<Profile> {
        self.graph.send_request(caller, email)?;

        // Resolution just succeeded inside send_request.
        let target = self
            .directory
            .user_by_email(email)
            .map_err(GraphError::Directory)?
            .ok_or_else(|| GraphError::UnknownUser(email.to_string()))?;
        self.graph.profile_of(target.id)
    }

    /// Accepts the pending request from the user behind `email` and
    /// returns the caller's updated profile.
    ///
    /// # Errors
    ///
    /// See [`FriendGraph::accept_request`].
    pub fn accept_friend_request(&self, caller: UserId, email: &str) -> graph::Result<Profile> {
        self.graph.accept_request(caller, email)?;
        self.graph.profile_of(caller)
    }

    /// Returns the caller's relationship snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a store lookup fails.
    pub fn profile(&self, caller: UserId) -> graph::Result<Profile> {
        self.graph.profile_of(caller)
    }

    /// Returns the caller's friends as directory records.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or directory lookup fails.
    pub fn friends(&self, caller: UserId) -> graph::Result<Vec<User>> {
        self.graph.friends(caller)
    }

    /// Returns who is waiting on the caller's answer, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or directory lookup fails.
    pub fn friend_requests(&self, caller: UserId) -> graph::Result<Vec<User>> {
        self.graph.pending_requests(caller)
    }

    /// Returns everyone the caller could befriend.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or directory lookup fails.
    pub fn available_users(&self, caller: UserId) -> graph::Result<Vec<User>> {
        self.graph.available_users(caller)
    }

    /// Whether two users are friends.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub fn is_friend(&self, a: UserId, b: UserId) -> graph::Result<bool> {
        self.graph.is_friend(a, b)
    }

    // ==================== Feed ====================

    /// Creates a public post.
    ///
    /// # Errors
    ///
    /// See [`FeedService::create_post`].
    pub fn create_post(&self, caller: UserId, text: &str) -> feed::Result<Post> {
        self.feed.create_post(caller, text, PostPrivacy::Public)
    }

    /// Creates a friends-only post.
    ///
    /// # Errors
    ///
    /// See [`FeedService::create_post`].
    pub fn create_friends_post(&self, caller: UserId, text: &str) -> feed::Result<Post> {
        self.feed.create_post(caller, text, PostPrivacy::FriendsOnly)
    }

    /// Returns the caller's feed: every post they may read, most recent
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or graph lookup fails.
    pub fn feed(&self, caller: UserId) -> feed::Result<Vec<Post>> {
        self.feed.visible_posts(caller)
    }

    /// Returns a single post if the caller may read it.
    ///
    /// # Errors
    ///
    /// See [`FeedService::post_for`].
    pub fn post(&self, caller: UserId, post_id: PostId) -> feed::Result<Post> {
        self.feed.post_for(caller, post_id)
    }

    /// Deletes a post the caller owns.
    ///
    /// # Errors
    ///
    /// See [`FeedService::delete_post`].
    pub fn delete_post(&self, caller: UserId, post_id: PostId) -> feed::Result<()> {
        self.feed.delete_post(caller, post_id)
    }

    // ==================== Engagement ====================

    /// Likes a post the caller can read and returns the updated like
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post is missing or hidden
    /// from the caller, or [`FeedError::AlreadyLiked`] on a repeat.
    pub fn like_post(&self, caller: UserId, post_id: PostId) -> feed::Result<Vec<UserId>> {
        self.feed.post_for(caller, post_id)?;
        self.engagement.like(caller, post_id)?;
        self.engagement.likes(post_id)
    }

    /// Removes the caller's like and returns the updated like sequence.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post is missing or hidden
    /// from the caller, or [`FeedError::NotLiked`] if there was nothing
    /// to remove.
    pub fn unlike_post(&self, caller: UserId, post_id: PostId) -> feed::Result<Vec<UserId>> {
        self.feed.post_for(caller, post_id)?;
        self.engagement.unlike(caller, post_id)?;
        self.engagement.likes(post_id)
    }

    /// Comments on a post the caller can read and returns the updated
    /// comment sequence, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post is missing or hidden
    /// from the caller, or [`FeedError::EmptyText`] for a blank comment.
    pub fn comment_post(
        &self,
        caller: UserId,
        post_id: PostId,
        text: &str,
    ) -> feed::Result<Vec<Comment>> {
        self.feed.post_for(caller, post_id)?;
        self.engagement.add_comment(caller, post_id, text)?;
        self.engagement.comments(post_id)
    }

    /// Deletes the caller's comment and returns the updated comment
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post or comment is missing
    /// (or the post is hidden from the caller), or
    /// [`FeedError::NotAuthorized`] for someone else's comment.
    pub fn delete_comment(
        &self,
        caller: UserId,
        post_id: PostId,
        comment_id: CommentId,
    ) -> feed::Result<Vec<Comment>> {
        self.feed.post_for(caller, post_id)?;
        self.engagement.delete_comment(caller, post_id, comment_id)?;
        self.engagement.comments(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn core_with_alice_and_bob() -> (SocialCore, UserId, UserId) {
        let core = SocialCore::in_memory().unwrap();
        let alice = core.register_user("Alice", "alice@x.com", None).unwrap();
        let bob = core.register_user("Bob", "bob@x.com", None).unwrap();
        (core, alice.id, bob.id)
    }

    #[test]
    fn open_creates_store_files() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("core");

        let core = SocialCore::open(&data_dir).unwrap();
        core.register_user("Alice", "alice@x.com", None).unwrap();

        assert!(data_dir.join("users.db").exists());
        assert!(data_dir.join("graph.db").exists());
        assert!(data_dir.join("feed.db").exists());
    }

    #[test]
    fn request_then_accept_scenario() {
        let (core, alice, bob) = core_with_alice_and_bob();

        let target_profile = core.send_friend_request(alice, "bob@x.com").unwrap();
        assert_eq!(target_profile.owner, bob);
        assert_eq!(target_profile.pending_requests, vec![alice]);

        let accepter_profile = core.accept_friend_request(bob, "alice@x.com").unwrap();
        assert_eq!(accepter_profile.owner, bob);
        assert!(accepter_profile.friends.contains(&alice));
        assert!(accepter_profile.pending_requests.is_empty());

        assert!(core.is_friend(alice, bob).unwrap());
        assert!(core.is_friend(bob, alice).unwrap());
    }

    #[test]
    fn private_post_lifecycle_across_friendship() {
        let (core, alice, bob) = core_with_alice_and_bob();

        let post = core.create_friends_post(bob, "friends only").unwrap();

        // Before friendship: hidden, and liking is blocked the same way.
        assert!(matches!(
            core.post(alice, post.id).unwrap_err(),
            FeedError::NotFound
        ));
        assert!(matches!(
            core.like_post(alice, post.id).unwrap_err(),
            FeedError::NotFound
        ));

        core.send_friend_request(alice, "bob@x.com").unwrap();
        core.accept_friend_request(bob, "alice@x.com").unwrap();

        // After friendship: readable, likable exactly once.
        assert_eq!(core.post(alice, post.id).unwrap().text, "friends only");
        assert_eq!(core.like_post(alice, post.id).unwrap(), vec![alice]);
        assert!(matches!(
            core.like_post(alice, post.id).unwrap_err(),
            FeedError::AlreadyLiked
        ));
    }

    #[test]
    fn feed_is_scoped_per_caller() {
        let (core, alice, bob) = core_with_alice_and_bob();
        core.create_post(alice, "hello world").unwrap();
        core.create_friends_post(bob, "inner circle").unwrap();

        let alice_feed = core.feed(alice).unwrap();
        let bodies: Vec<&str> = alice_feed.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(bodies, vec!["hello world"]);

        let bob_feed = core.feed(bob).unwrap();
        let bodies: Vec<&str> = bob_feed.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(bodies, vec!["inner circle", "hello world"]);
    }

    #[test]
    fn comment_flow_returns_updated_sequence() {
        let (core, alice, bob) = core_with_alice_and_bob();
        let post = core.create_post(bob, "open thread").unwrap();

        let comments = core.comment_post(alice, post.id, "first!").unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, alice);

        let comments = core.comment_post(bob, post.id, "thanks").unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "thanks");

        let remaining = core.delete_comment(alice, post.id, comments[1].id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "thanks");
    }

    #[test]
    fn deleting_someone_elses_comment_is_rejected() {
        let (core, alice, bob) = core_with_alice_and_bob();
        let post = core.create_post(bob, "open thread").unwrap();
        let comments = core.comment_post(alice, post.id, "mine").unwrap();

        let err = core
            .delete_comment(bob, post.id, comments[0].id)
            .unwrap_err();
        assert!(matches!(err, FeedError::NotAuthorized));
    }

    #[test]
    fn register_user_rejects_duplicate_email() {
        let (core, _, _) = core_with_alice_and_bob();
        let err = core
            .register_user("Other Alice", "alice@x.com", None)
            .unwrap_err();
        assert!(matches!(err, DirectoryError::EmailInUse(_)));
    }

    #[test]
    fn available_users_shrink_as_friendships_form() {
        let (core, alice, bob) = core_with_alice_and_bob();
        let carol = core.register_user("Carol", "carol@x.com", None).unwrap();

        assert_eq!(core.available_users(alice).unwrap().len(), 2);

        core.send_friend_request(alice, "bob@x.com").unwrap();
        core.accept_friend_request(bob, "alice@x.com").unwrap();

        let remaining: Vec<UserId> = core
            .available_users(alice)
            .unwrap()
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(remaining, vec![carol.id]);
    }

    #[test]
    fn unlike_before_like_is_rejected() {
        let (core, alice, bob) = core_with_alice_and_bob();
        let post = core.create_post(bob, "open").unwrap();

        assert!(matches!(
            core.unlike_post(alice, post.id).unwrap_err(),
            FeedError::NotLiked
        ));

        core.like_post(alice, post.id).unwrap();
        assert_eq!(
            core.unlike_post(alice, post.id).unwrap(),
            Vec::<UserId>::new()
        );
    }
}
