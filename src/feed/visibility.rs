//! The post visibility rule.
//!
//! One function decides whether a requester may read a post. Every read
//! path goes through it, and the deny outcome is always reported as
//! "not found" by callers so a hidden post's existence leaks nowhere.

use std::collections::BTreeSet;

use super::types::{Post, PostPrivacy};
use crate::directory::UserId;

/// Whether `requester` may read `post`.
///
/// `requester_friends` is the requester's friend set. Callers filtering
/// many posts fetch it once and reuse it, keeping a feed scan linear in
/// the number of posts.
///
/// The rule, first match wins: public posts are readable by everyone;
/// authors always read their own posts; friends-only posts are readable
/// by the author's friends.
#[must_use]
pub fn can_view(requester: UserId, post: &Post, requester_friends: &BTreeSet<UserId>) -> bool {
    match post.privacy {
        PostPrivacy::Public => true,
        PostPrivacy::FriendsOnly => {
            requester == post.author || requester_friends.contains(&post.author)
        }
    }
}
