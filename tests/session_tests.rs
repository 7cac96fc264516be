// Integration tests exercising the chat -> pool -> session flow end to end.

use chatterdle::chat::{self, ChatLine};
use chatterdle::{
    CandidatePool, ChatterMeta, EmptyPoolError, Feedback, GameSession, InputMode, MAX_GUESSES,
    PoolFilter, RoundStatus,
};
use std::io::Cursor;
use std::sync::mpsc;

fn meta(moderator: bool, subscriber: bool) -> ChatterMeta {
    ChatterMeta {
        is_moderator: moderator,
        is_subscriber: subscriber,
        display_color: String::new(),
    }
}

fn type_word(session: &mut GameSession, word: &str) {
    for c in word.chars() {
        session.press_key(c);
    }
}

#[test]
fn duplicate_chat_arrivals_keep_first_seen_metadata() {
    let mut pool = CandidatePool::new();
    assert!(pool.insert("alice", meta(false, true)));
    assert!(!pool.insert("alice", meta(true, false)));
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.get("alice"), Some(&meta(false, true)));
}

#[test]
fn round_start_respects_the_role_filter() {
    let mut pool = CandidatePool::new();
    pool.insert("lurker", meta(false, false));
    pool.insert("themod", meta(true, false));

    let mut session = GameSession::seeded(InputMode::AutoAdvance, 3);
    session
        .start_round(
            &pool,
            PoolFilter::Roles {
                moderators: true,
                subscribers: false,
            },
        )
        .unwrap();
    assert_eq!(session.target(), "themod");
}

#[test]
fn filtered_out_pool_refuses_to_start() {
    let mut pool = CandidatePool::new();
    pool.insert("lurker", meta(false, false));

    let mut session = GameSession::seeded(InputMode::AutoAdvance, 3);
    let result = session.start_round(
        &pool,
        PoolFilter::Roles {
            moderators: true,
            subscribers: true,
        },
    );
    assert_eq!(result, Err(EmptyPoolError));
    assert_eq!(session.status(), RoundStatus::Idle);
    assert_eq!(session.target_len(), 0);
}

#[test]
fn same_seed_same_target_different_seed_can_differ() {
    let mut pool = CandidatePool::new();
    for login in ["a1", "b2", "c3", "d4", "e5", "f6", "g7", "h8"] {
        pool.insert(login, ChatterMeta::default());
    }
    let target_for = |seed| {
        let mut session = GameSession::seeded(InputMode::AutoAdvance, seed);
        session.start_round(&pool, PoolFilter::All).unwrap();
        session.target()
    };
    assert_eq!(target_for(11), target_for(11));
    let distinct = (0..16).map(target_for).collect::<std::collections::HashSet<_>>();
    assert!(distinct.len() > 1, "16 seeds all picked the same target");
}

#[test]
fn full_round_lost_then_reset_plays_again() {
    let mut pool = CandidatePool::new();
    pool.insert("abc", ChatterMeta::default());
    let mut session = GameSession::seeded(InputMode::AutoAdvance, 0);
    session.start_round(&pool, PoolFilter::All).unwrap();

    for i in 1..=MAX_GUESSES {
        type_word(&mut session, "zzz");
        session.submit_guess();
        assert_eq!(session.guesses().len(), i);
    }
    assert_eq!(session.status(), RoundStatus::Lost);
    assert_eq!(session.guesses_remaining(), 0);
    assert_eq!(session.keys().color('z'), Some(Feedback::Absent));

    // Terminal state only leaves through reset.
    type_word(&mut session, "abc");
    session.submit_guess();
    assert_eq!(session.status(), RoundStatus::Lost);

    session.reset(&pool, PoolFilter::All).unwrap();
    assert_eq!(session.status(), RoundStatus::Active);
    assert!(session.guesses().is_empty());
    assert_eq!(session.keys().color('z'), None);

    type_word(&mut session, "abc");
    session.submit_guess();
    assert_eq!(session.status(), RoundStatus::Won);
}

#[test]
fn winning_guess_on_the_last_row_is_a_win() {
    let mut pool = CandidatePool::new();
    pool.insert("abc", ChatterMeta::default());
    let mut session = GameSession::seeded(InputMode::AutoAdvance, 0);
    session.start_round(&pool, PoolFilter::All).unwrap();

    for _ in 0..MAX_GUESSES - 1 {
        type_word(&mut session, "zzz");
        session.submit_guess();
    }
    type_word(&mut session, "abc");
    session.submit_guess();
    assert_eq!(session.status(), RoundStatus::Won);
}

#[test]
fn key_state_accumulates_over_the_round() {
    let mut pool = CandidatePool::new();
    pool.insert("banana", ChatterMeta::default());
    let mut session = GameSession::seeded(InputMode::AutoAdvance, 0);
    session.start_round(&pool, PoolFilter::All).unwrap();

    type_word(&mut session, "nanana");
    session.submit_guess();
    assert_eq!(session.keys().color('n'), Some(Feedback::Correct));
    assert_eq!(session.keys().color('a'), Some(Feedback::Correct));

    type_word(&mut session, "xxxxxx");
    session.submit_guess();
    assert_eq!(session.keys().color('n'), Some(Feedback::Correct));
    assert_eq!(session.keys().color('x'), Some(Feedback::Absent));
    assert!(session.keys().occurrence_floor('a') >= 2);
}

#[test]
fn chat_stream_feeds_a_playable_pool() {
    let input = "\
:tmi.twitch.tv 001 justinfan99 :Welcome, GLHF!\r\n\
@badges=;color=#00FF00;mod=0;subscriber=0 :ab!ab@ab.tmi.twitch.tv PRIVMSG #chan :first\r\n\
@badges=;color=;mod=1;subscriber=0 :ab!ab@ab.tmi.twitch.tv PRIVMSG #chan :again\r\n\
PING :tmi.twitch.tv\r\n\
@badges=;color=;mod=0;subscriber=1 :cd!cd@cd.tmi.twitch.tv PRIVMSG #other :wrong room\r\n";

    let (tx, rx) = mpsc::channel();
    let mut pong = Vec::new();
    {
        // Drive the parser directly so the pong sink stays inspectable.
        for line in input.lines() {
            match chat::parse_line(line, "chan") {
                Some(ChatLine::Message(event)) => tx.send(event).unwrap(),
                Some(ChatLine::Ping(payload)) => {
                    pong.extend_from_slice(format!("PONG :{payload}\r\n").as_bytes());
                }
                None => {}
            }
        }
    }
    drop(tx);
    assert_eq!(pong, b"PONG :tmi.twitch.tv\r\n");

    let mut pool = CandidatePool::new();
    for event in rx {
        pool.insert(&event.login, event.meta);
    }
    // One login despite two messages, the off-channel chatter excluded,
    // first-seen metadata (not a moderator) retained.
    assert_eq!(pool.len(), 1);
    assert!(!pool.get("ab").unwrap().is_moderator);
    assert_eq!(pool.get("ab").unwrap().display_color, "#00FF00");

    let mut session = GameSession::seeded(InputMode::AutoAdvance, 5);
    session.start_round(&pool, PoolFilter::All).unwrap();
    assert_eq!(session.target(), "ab");
}

#[test]
fn reader_thread_and_session_cooperate() {
    let input = "@mod=0;subscriber=0;color= :guessme!g@g.tmi.twitch.tv PRIVMSG #chan :hello\r\n";
    let (tx, rx) = mpsc::channel();
    chat::spawn_reader(Cursor::new(input.to_string()), None::<Vec<u8>>, "chan".to_string(), tx)
        .join()
        .unwrap();

    let mut pool = CandidatePool::new();
    for event in rx {
        pool.insert(&event.login, event.meta);
    }
    let mut session = GameSession::seeded(InputMode::AutoAdvance, 1);
    session.start_round(&pool, PoolFilter::All).unwrap();
    type_word(&mut session, "guessme");
    session.submit_guess();
    assert_eq!(session.status(), RoundStatus::Won);
    assert!(session.modal_message().is_some());
}
