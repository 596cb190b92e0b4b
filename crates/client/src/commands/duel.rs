use anyhow::{Result, ensure};
use clap::Parser;
use janken_core::{GameMode, Move};
use janken_runtime::RuntimeHandle;

use super::{GameReport, Player, parse_move, parse_player, resolve};

/// Play one round between two players
#[derive(Parser, Debug)]
pub struct DemoDuel {
    /// Player 1's move
    #[arg(long, value_parser = parse_move)]
    pub p1: Move,

    /// Player 2's move
    #[arg(long, value_parser = parse_move)]
    pub p2: Move,

    /// Creator of the game
    #[arg(long, default_value = "alice", value_parser = parse_player)]
    pub player1: Player,

    /// Player joining the game
    #[arg(long, default_value = "bob", value_parser = parse_player)]
    pub player2: Player,
}

impl DemoDuel {
    pub async fn execute(self, handle: &RuntimeHandle) -> Result<GameReport> {
        ensure!(
            self.player1.id != self.player2.id,
            "a player cannot duel themselves"
        );

        let game_id = handle
            .create_game(GameMode::TwoPlayer, self.player1.id)
            .await?;
        handle.join_game(game_id, self.player2.id).await?;
        tracing::info!(
            "Game {}: {} vs {}",
            game_id,
            self.player1.name,
            self.player2.name
        );

        handle.play_move(game_id, self.player1.id, self.p1).await?;
        let receipt = handle.play_move(game_id, self.player2.id, self.p2).await?;
        ensure!(
            receipt.ready_to_resolve,
            "game {game_id} is missing a move"
        );

        let (game, result) = resolve(handle, game_id).await?;
        Ok(GameReport::new(
            &game,
            &result,
            (&self.player1, Some(self.p1)),
            (&self.player2, Some(self.p2)),
        ))
    }
}
