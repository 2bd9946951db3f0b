//! Integration tests for the duelforge server over real TCP.

use std::time::Duration;

use duelforge::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = Server::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> TcpStream {
    TcpStream::connect(addr).await.expect("should connect")
}

/// Reads from the stream into `collected` until `needle` appears.
async fn read_until(stream: &mut TcpStream, collected: &mut String, needle: &str) {
    let mut buf = [0u8; 1024];
    while !collected.contains(needle) {
        let n = tokio::time::timeout(
            Duration::from_secs(5),
            stream.read(&mut buf),
        )
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}"))
        .expect("read");
        assert!(n > 0, "connection closed while waiting for {needle:?}");
        collected.push_str(&String::from_utf8_lossy(&buf[..n]));
    }
}

/// Connects and completes name entry, returning the stream and the
/// output seen so far.
async fn join(addr: &str, name: &str) -> (TcpStream, String) {
    let mut stream = connect(addr).await;
    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "enter your name: ").await;
    stream
        .write_all(format!("{name}\n").as_bytes())
        .await
        .expect("send name");
    (stream, seen)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_welcome_prompt_on_connect() {
    let addr = start_server().await;
    let mut stream = connect(&addr).await;
    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "Welcome! Please enter your name: ")
        .await;
}

#[tokio::test]
async fn test_lone_player_awaits_an_opponent() {
    let addr = start_server().await;
    let (mut stream, mut seen) = join(&addr, "Ann").await;
    read_until(&mut stream, &mut seen, "You are awaiting an opponent...\n")
        .await;
    assert!(!seen.contains("Match started"));
}

#[tokio::test]
async fn test_empty_name_is_reprompted() {
    let addr = start_server().await;
    let mut stream = connect(&addr).await;
    let mut seen = String::new();
    read_until(&mut stream, &mut seen, "enter your name: ").await;
    stream.write_all(b"\n").await.expect("send newline");
    read_until(
        &mut stream,
        &mut seen,
        "Name cannot be empty, please enter your name: ",
    )
    .await;
}

#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let addr = start_server().await;
    let (mut first, mut seen_first) = join(&addr, "Ann").await;
    read_until(&mut first, &mut seen_first, "awaiting an opponent").await;

    let (mut second, mut seen_second) = join(&addr, "Ann").await;
    read_until(
        &mut second,
        &mut seen_second,
        "Name already taken, please enter a different name: ",
    )
    .await;
}

#[tokio::test]
async fn test_two_players_are_matched() {
    let addr = start_server().await;
    let (mut ann, mut seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;

    read_until(&mut ann, &mut seen_ann, "You are matched with Bo!").await;
    read_until(&mut bo, &mut seen_bo, "You are matched with Ann!").await;
    assert!(seen_ann.contains("Match started!"));
    assert!(seen_bo.contains("Match started!"));

    // Both get the menu; exactly one goes first.
    read_until(&mut ann, &mut seen_ann, "(t)ime left").await;
    read_until(&mut bo, &mut seen_bo, "(t)ime left").await;
    let ann_first = seen_ann.contains("You go first.");
    let bo_first = seen_bo.contains("You go first.");
    assert!(ann_first != bo_first, "exactly one side goes first");
}

#[tokio::test]
async fn test_attack_is_reported_to_both_sides() {
    let addr = start_server().await;
    let (mut ann, mut seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;
    read_until(&mut ann, &mut seen_ann, "You go ").await;
    read_until(&mut bo, &mut seen_bo, "You go ").await;

    let (attacker, attacker_seen, defender, defender_seen) =
        if seen_ann.contains("You go first.") {
            (&mut ann, &mut seen_ann, &mut bo, &mut seen_bo)
        } else {
            (&mut bo, &mut seen_bo, &mut ann, &mut seen_ann)
        };

    attacker.write_all(b"a").await.expect("send attack");
    read_until(attacker, attacker_seen, "You attacked ").await;
    read_until(defender, defender_seen, " attacked you for ").await;
    // The defender now holds the turn.
    read_until(defender, defender_seen, "It's your turn").await;
    read_until(attacker, attacker_seen, "Waiting for ").await;
}

#[tokio::test]
async fn test_chat_reaches_the_opponent() {
    let addr = start_server().await;
    let (mut ann, mut seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;
    read_until(&mut ann, &mut seen_ann, "You go ").await;
    read_until(&mut bo, &mut seen_bo, "You go ").await;

    let (speaker, speaker_seen, listener, listener_seen, speaker_name) =
        if seen_ann.contains("You go first.") {
            (&mut ann, &mut seen_ann, &mut bo, &mut seen_bo, "Ann")
        } else {
            (&mut bo, &mut seen_bo, &mut ann, &mut seen_ann, "Bo")
        };

    speaker.write_all(b"s").await.expect("send speak");
    read_until(speaker, speaker_seen, "Speak (max 20 chars): ").await;
    speaker.write_all(b"gl hf\n").await.expect("send message");
    read_until(listener, listener_seen, &format!("{speaker_name} says: gl hf\n"))
        .await;
}

#[tokio::test]
async fn test_time_query_answers_in_seconds() {
    let addr = start_server().await;
    let (mut ann, mut seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;
    read_until(&mut ann, &mut seen_ann, "You go ").await;
    read_until(&mut bo, &mut seen_bo, "You go ").await;

    // Either side may ask, whoever's turn it is.
    ann.write_all(b"t").await.expect("send query");
    read_until(&mut ann, &mut seen_ann, "Remaining time: ").await;
    read_until(&mut ann, &mut seen_ann, " seconds.\n").await;
}

#[tokio::test]
async fn test_disconnect_mid_battle_grants_the_win() {
    let addr = start_server().await;
    let (mut ann, mut seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;
    read_until(&mut ann, &mut seen_ann, "You go ").await;
    read_until(&mut bo, &mut seen_bo, "You go ").await;

    drop(ann);
    read_until(
        &mut bo,
        &mut seen_bo,
        "Ann has dropped. You Won! You are back in the arena waiting for a new opponent.\n",
    )
    .await;
    read_until(&mut bo, &mut seen_bo, "You are awaiting an opponent...\n")
        .await;
}

#[tokio::test]
async fn test_departure_is_broadcast_to_the_arena() {
    let addr = start_server().await;
    let (mut ann, mut seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;
    let (cai, _) = join(&addr, "Cai").await;
    read_until(&mut ann, &mut seen_ann, "You go ").await;
    read_until(&mut bo, &mut seen_bo, "You go ").await;

    drop(cai);
    read_until(&mut ann, &mut seen_ann, "Cai has left the arena.\n").await;
    read_until(&mut bo, &mut seen_bo, "Cai has left the arena.\n").await;
}

#[tokio::test]
async fn test_polled_expiry_only_server_still_plays() {
    // With the sweep disabled, expiry is input-polled; everything else
    // behaves identically.
    let server = Server::builder()
        .bind("127.0.0.1:0")
        .polled_expiry_only()
        .build()
        .await
        .expect("server should build");
    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let (mut ann, mut seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;
    read_until(&mut ann, &mut seen_ann, "You go ").await;
    read_until(&mut bo, &mut seen_bo, "You go ").await;

    let (attacker, attacker_seen) = if seen_ann.contains("You go first.") {
        (&mut ann, &mut seen_ann)
    } else {
        (&mut bo, &mut seen_bo)
    };
    attacker.write_all(b"a").await.expect("send attack");
    read_until(attacker, attacker_seen, "You attacked ").await;
}

#[tokio::test]
async fn test_survivor_is_rematched_with_a_waiter() {
    let addr = start_server().await;
    let (ann, _seen_ann) = join(&addr, "Ann").await;
    let (mut bo, mut seen_bo) = join(&addr, "Bo").await;
    read_until(&mut bo, &mut seen_bo, "You go ").await;
    let (mut cai, mut seen_cai) = join(&addr, "Cai").await;
    read_until(&mut cai, &mut seen_cai, "You are awaiting an opponent...\n")
        .await;

    drop(ann);
    read_until(&mut bo, &mut seen_bo, "You are matched with Cai!").await;
    read_until(&mut cai, &mut seen_cai, "You are matched with Bo!").await;
}
