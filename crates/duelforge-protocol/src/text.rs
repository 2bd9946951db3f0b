//! Every client-visible message, byte-for-byte.
//!
//! Deployed clients scrape these lines, so the wording (including the
//! leading blank lines and the long-standing "didnt" in the timeout
//! notice) is load-bearing. Change nothing here without bumping the
//! protocol.

/// Sent immediately on connect.
pub const WELCOME: &str = "Welcome! Please enter your name: ";

/// Reprompt after an empty name submission.
pub const NAME_EMPTY: &str =
    "Name cannot be empty, please enter your name: ";

/// Reprompt after a duplicate name submission.
pub const NAME_TAKEN: &str =
    "Name already taken, please enter a different name: ";

/// Sent to a named player with no available opponent.
pub const AWAITING_OPPONENT: &str = "You are awaiting an opponent...\n";

/// Sent to both players when a match begins.
pub const MATCH_STARTED: &str =
    "Match started! Remember during your turn you have 30 seconds to attack.\n";

/// Refusal when a power move is attempted with none left.
pub const NO_POWER_MOVES: &str = "No more power moves left!\n";

/// Chat-entry prompt.
pub const SPEAK_PROMPT: &str = "\nSpeak (max 20 chars): ";

/// One-time warning when the chat buffer overflows its bound.
pub const CHAT_OVERFLOW: &str =
    "\nMessage too long! Finish and hit enter.\n";

/// Rejection when an overlong chat message is flushed.
pub const CHAT_TOO_LONG: &str = "Message too long! Not sent.\n";

/// Rejection when an empty chat message is flushed.
pub const CHAT_EMPTY: &str = "\nYou didn't say anything.\n";

/// Sent to the player whose turn expired.
pub const TIMEOUT_SELF: &str =
    "\nTime's up! You didnt attack. Wait till your turn.\n";

/// Miss notice to the player whose power move failed.
pub const POWER_MISSED_SELF: &str = "Your power move missed!\n";

/// Arena-entry broadcast.
pub fn entered_arena(name: &str) -> String {
    format!("{name} has entered the arena.\n")
}

/// Arena-exit broadcast.
pub fn left_arena(name: &str) -> String {
    format!("{name} has left the arena.\n")
}

/// Match-start notice naming the opponent and the turn order.
pub fn matched(opponent: &str, goes_first: bool) -> String {
    let order = if goes_first { "first" } else { "second" };
    format!(
        "You are matched with {opponent}! Let the battle begin!\nYou go {order}.\n"
    )
}

/// The standard status prompt: own stats, opponent hitpoints, action menu.
pub fn status_prompt(hitpoints: i32, powermoves: u8, opponent_hitpoints: i32) -> String {
    format!(
        "\n\nYour hitpoints: {hitpoints}\nYour powermoves: {powermoves}\nOpponent's hitpoints: {opponent_hitpoints}\n\n(a)ttack\n(p)owermove\n(s)peak\n(t)ime left\n\n"
    )
}

/// Prompt for the newly active player after a non-lethal turn.
pub fn your_turn_prompt(
    hitpoints: i32,
    powermoves: u8,
    opponent: &str,
    opponent_hitpoints: i32,
) -> String {
    format!(
        "\nIt's your turn\n\nYour hitpoints: {hitpoints}\nYour powermoves: {powermoves}\n\n{opponent}'s hitpoints: {opponent_hitpoints}\n\n(a)ttack\n(p)owermove\n(s)peak\n(t)ime left\n\n"
    )
}

/// Notice to the player who just finished their turn.
pub fn waiting_for(opponent: &str) -> String {
    format!("Waiting for {opponent} to make a move...\n")
}

/// Attack report to the attacker.
pub fn attack_dealt(opponent: &str, damage: i32) -> String {
    format!("\nYou attacked {opponent} for {damage} damage.\n")
}

/// Attack report to the defender.
pub fn attack_received(attacker: &str, damage: i32) -> String {
    format!("{attacker} attacked you for {damage} damage.\n")
}

/// Power-move miss notice to the defender.
pub fn power_missed(attacker: &str) -> String {
    format!("{attacker}'s power move missed!\n")
}

/// Victory notice to the winner.
pub fn victory(loser: &str) -> String {
    format!("You defeated {loser}! Congratulations!\n")
}

/// Defeat notice to the loser.
pub fn defeat(winner: &str) -> String {
    format!("{winner} defeated you. Better luck next time!\n")
}

/// A delivered chat line, sent to the opponent only.
pub fn says(name: &str, message: &str) -> String {
    format!("{name} says: {message}\n")
}

/// Response to a time-left query.
pub fn remaining_time(seconds: u64) -> String {
    format!("\nRemaining time: {seconds} seconds.\n")
}

/// Timeout notice to the player who just gained the turn.
pub fn timeout_opponent(timed_out: &str) -> String {
    format!(
        "\nTime's up! {timed_out} didn't make a move in time. 0 damage dealt. It's now your turn.\n"
    )
}

/// Forfeit notice to the survivor of a mid-battle disconnect.
pub fn dropped_win(leaver: &str) -> String {
    format!(
        "{leaver} has dropped. You Won! You are back in the arena waiting for a new opponent.\n"
    )
}
