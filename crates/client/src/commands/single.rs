use anyhow::{Result, ensure};
use clap::Parser;
use janken_core::{GameMode, Move};
use janken_runtime::RuntimeHandle;

use super::{GameReport, Player, parse_move, parse_player, resolve};

/// Play one round against the computer
#[derive(Parser, Debug)]
pub struct DemoSingle {
    /// Move to play: rock, paper or scissors
    #[arg(long = "move", value_parser = parse_move)]
    pub mv: Move,

    /// Player name (alice, bob, charlie, dave, eve) or address
    #[arg(long, default_value = "alice", value_parser = parse_player)]
    pub player: Player,
}

impl DemoSingle {
    pub async fn execute(self, handle: &RuntimeHandle) -> Result<GameReport> {
        let game_id = handle
            .create_game(GameMode::SinglePlayer, self.player.id)
            .await?;
        tracing::info!("Created game {} for {}", game_id, self.player.name);

        let receipt = handle.play_move(game_id, self.player.id, self.mv).await?;
        ensure!(
            receipt.cpu_moved && receipt.ready_to_resolve,
            "computer did not answer game {game_id}"
        );

        let (game, result) = resolve(handle, game_id).await?;
        Ok(GameReport::new(
            &game,
            &result,
            (&self.player, Some(self.mv)),
            (&Player::computer(), None),
        ))
    }
}
