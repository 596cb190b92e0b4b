//! Demo subcommands and the report they print.

mod duel;
mod single;

pub use duel::DemoDuel;
pub use single::DemoSingle;

use std::time::Duration;

use anyhow::{Context, Result};
use janken_core::{Game, GameId, GameResult, Move, PlayerId};
use janken_runtime::RuntimeHandle;
use serde::Serialize;

/// How long a demo waits for the oracle before giving up.
const RESULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Named demo players, mapped to fixed addresses.
const ROSTER: [&str; 5] = ["alice", "bob", "charlie", "dave", "eve"];

/// A participant as given on the command line.
#[derive(Clone, Debug)]
pub struct Player {
    pub name: String,
    pub id: PlayerId,
}

impl Player {
    fn computer() -> Self {
        Self {
            name: "computer".to_string(),
            id: PlayerId::CPU,
        }
    }
}

/// Accepts a roster name or a `0x`-prefixed 20-byte address.
pub fn parse_player(input: &str) -> Result<Player, String> {
    let lowered = input.to_ascii_lowercase();
    if let Some(index) = ROSTER.iter().position(|name| *name == lowered) {
        return Ok(Player {
            name: lowered,
            id: PlayerId::from_low_u64(0x1000 + index as u64),
        });
    }

    let id: PlayerId = input
        .parse()
        .map_err(|e| format!("`{input}` is neither a known player nor an address: {e}"))?;
    if id.is_reserved() {
        return Err(format!("{id} is a reserved address"));
    }
    Ok(Player {
        name: id.to_string(),
        id,
    })
}

pub fn parse_move(input: &str) -> Result<Move, String> {
    input
        .parse()
        .map_err(|_| format!("unknown move `{input}` (expected rock, paper or scissors)"))
}

/// Resolves a game whose moves are all in and waits for the oracle.
async fn resolve(handle: &RuntimeHandle, game_id: GameId) -> Result<(Game, GameResult)> {
    let request_id = handle.check_winner(game_id).await?;
    tracing::info!("Game {} waiting on decryption {}", game_id, request_id);

    let result = tokio::time::timeout(RESULT_TIMEOUT, handle.wait_for_result(game_id))
        .await
        .context("Decryption oracle did not answer in time")??;
    let game = handle.get_game(game_id).await?;
    Ok((game, result))
}

/// What a demo prints once its game is finished.
#[derive(Debug, Serialize)]
pub struct GameReport {
    pub game_id: GameId,
    pub mode: String,
    pub player1: ReportedPlayer,
    pub player2: ReportedPlayer,
    /// `draw`, `player1`, `player2` or `computer`.
    pub outcome: &'static str,
    pub winner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportedPlayer {
    pub name: String,
    pub address: String,
    /// Plaintext move, known only for moves this client chose.
    #[serde(rename = "move")]
    pub mv: Option<Move>,
}

impl GameReport {
    fn new(
        game: &Game,
        result: &GameResult,
        player1: (&Player, Option<Move>),
        player2: (&Player, Option<Move>),
    ) -> Self {
        let outcome = if result.is_draw {
            "draw"
        } else if result.cpu_won {
            "computer"
        } else if result.player1_won {
            "player1"
        } else {
            "player2"
        };

        let reported = |(player, mv): (&Player, Option<Move>)| ReportedPlayer {
            name: player.name.clone(),
            address: player.id.to_string(),
            mv,
        };

        Self {
            game_id: game.id(),
            mode: game.mode().to_string(),
            player1: reported(player1),
            player2: reported(player2),
            outcome,
            winner: result.winner.map(|winner| winner.to_string()),
        }
    }

    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        println!("Game {} ({})", self.game_id, self.mode);
        for (seat, player) in [("player1", &self.player1), ("player2", &self.player2)] {
            let mv = player
                .mv
                .map_or_else(|| "hidden".to_string(), |mv| mv.to_string());
            println!("  {seat}: {} [{}] played {mv}", player.name, player.address);
        }
        match self.outcome {
            "draw" => println!("Result: draw"),
            "computer" => println!("Result: the computer wins"),
            "player1" => println!("Result: {} wins", self.player1.name),
            _ => println!("Result: {} wins", self.player2.name),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_names_are_case_insensitive() {
        let alice = parse_player("Alice").unwrap();
        assert_eq!(alice.name, "alice");
        assert_eq!(alice.id, PlayerId::from_low_u64(0x1000));
        assert_eq!(parse_player("eve").unwrap().id, PlayerId::from_low_u64(0x1004));
    }

    #[test]
    fn addresses_are_accepted_unless_reserved() {
        let address = "0x00000000000000000000000000000000000000ff";
        assert_eq!(parse_player(address).unwrap().id, PlayerId::from_low_u64(0xff));
        assert!(parse_player(&PlayerId::CPU.to_string()).is_err());
        assert!(parse_player(&PlayerId::ZERO.to_string()).is_err());
        assert!(parse_player("mallory").is_err());
    }

    #[test]
    fn moves_parse_case_insensitively() {
        assert_eq!(parse_move("ROCK").unwrap(), Move::Rock);
        assert_eq!(parse_move("scissors").unwrap(), Move::Scissors);
        assert!(parse_move("lizard").is_err());
    }
}
