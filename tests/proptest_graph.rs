//! Property-based tests for the friend graph.
//!
//! These generate arbitrary interleavings of send/accept operations over
//! a small user pool and assert the structural invariants that must hold
//! after any sequence of operations:
//! - friendship is symmetric in both directions
//! - a pending queue never contains duplicates, the owner, or a friend
//! - likes follow set semantics no matter how a sequence interleaves

use proptest::prelude::*;
use trellis_core::directory::{User, UserId};
use trellis_core::SocialCore;

const POOL: usize = 4;

/// One step of a generated interaction history.
#[derive(Debug, Clone, Copy)]
enum Op {
    Send { from: usize, to: usize },
    Accept { who: usize, from: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POOL, 0..POOL).prop_map(|(from, to)| Op::Send { from, to }),
        (0..POOL, 0..POOL).prop_map(|(who, from)| Op::Accept { who, from }),
    ]
}

fn seeded_core() -> (SocialCore, Vec<User>) {
    let core = SocialCore::in_memory().expect("should build core");
    let users = (0..POOL)
        .map(|i| {
            core.register_user(&format!("User {i}"), &format!("u{i}@x.com"), None)
                .expect("should register user")
        })
        .collect();
    (core, users)
}

/// Applies an operation, ignoring precondition failures. Invalid steps
/// are exactly what the invariants must survive.
fn apply(core: &SocialCore, users: &[User], op: Op) {
    match op {
        Op::Send { from, to } => {
            let _ = core.send_friend_request(users[from].id, &users[to].email);
        }
        Op::Accept { who, from } => {
            let _ = core.accept_friend_request(users[who].id, &users[from].email);
        }
    }
}

fn assert_invariants(core: &SocialCore, users: &[User]) {
    // Symmetry, for every pair and both directions.
    for a in users {
        for b in users {
            assert_eq!(
                core.is_friend(a.id, b.id).unwrap(),
                core.is_friend(b.id, a.id).unwrap(),
                "friendship must be symmetric for ({}, {})",
                a.id,
                b.id
            );
        }
    }

    for user in users {
        let profile = core.profile(user.id).unwrap();

        // Nobody is their own friend or their own pending request.
        assert!(!profile.friends.contains(&user.id));
        assert!(!profile.pending_requests.contains(&user.id));

        // No duplicate pending entries.
        let mut seen: Vec<UserId> = Vec::new();
        for &sender in &profile.pending_requests {
            assert!(
                !seen.contains(&sender),
                "duplicate pending request from {sender}"
            );
            seen.push(sender);
        }

        // Pending queue is disjoint from the friend set.
        for sender in &profile.pending_requests {
            assert!(
                !profile.friends.contains(sender),
                "pending request from existing friend {sender}"
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn graph_invariants_hold_after_any_history(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (core, users) = seeded_core();

        for op in ops {
            apply(&core, &users, op);
        }

        assert_invariants(&core, &users);
    }

    #[test]
    fn accepted_requests_always_produce_mutual_friends(
        ops in prop::collection::vec(op_strategy(), 0..30),
        from in 0..POOL,
        to in 0..POOL,
    ) {
        prop_assume!(from != to);

        let (core, users) = seeded_core();
        for op in ops {
            apply(&core, &users, op);
        }

        // Whatever happened before, a send that succeeds followed by an
        // accept that succeeds must end in mutual friendship.
        let sent = core.send_friend_request(users[from].id, &users[to].email).is_ok();
        let accepted = core
            .accept_friend_request(users[to].id, &users[from].email)
            .is_ok();

        if sent && accepted {
            prop_assert!(core.is_friend(users[from].id, users[to].id).unwrap());
            prop_assert!(core.is_friend(users[to].id, users[from].id).unwrap());
        }

        assert_invariants(&core, &users);
    }

    #[test]
    fn like_sequences_never_duplicate(likers in prop::collection::vec(0..POOL, 0..20)) {
        let (core, users) = seeded_core();
        let author = users[0].id;
        let post = core.create_post(author, "likable").unwrap();

        for liker in likers {
            let _ = core.like_post(users[liker].id, post.id);
        }

        let likes = core.post(author, post.id).unwrap().likes;
        let mut deduped = likes.clone();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(likes.len(), deduped.len(), "like set contains duplicates");
    }
}

#[test]
fn a_full_history_walkthrough_keeps_the_graph_consistent() {
    let (core, users) = seeded_core();

    // A fixed busy history touching every failure path at least once.
    let steps = [
        Op::Send { from: 0, to: 1 },
        Op::Send { from: 0, to: 1 }, // duplicate
        Op::Send { from: 1, to: 0 }, // crossed
        Op::Accept { who: 1, from: 0 },
        Op::Accept { who: 1, from: 0 }, // consumed
        Op::Send { from: 0, to: 1 },    // already friends
        Op::Send { from: 2, to: 1 },
        Op::Send { from: 3, to: 1 },
        Op::Accept { who: 1, from: 3 },
        Op::Accept { who: 0, from: 2 }, // no such request
    ];
    for op in steps {
        apply(&core, &users, op);
    }

    assert_invariants(&core, &users);
    assert!(core.is_friend(users[0].id, users[1].id).unwrap());
    assert!(core.is_friend(users[1].id, users[3].id).unwrap());
    assert!(!core.is_friend(users[0].id, users[2].id).unwrap());

    // User 1 still has user 2 waiting.
    let waiting = core.profile(users[1].id).unwrap().pending_requests;
    assert_eq!(waiting, vec![users[2].id]);
}
