use clap::Parser;
use client::game::ClientGameState;
use client::input::InputManager;
use client::network::NetworkClient;
use client::rendering::Renderer;
use log::{error, info};
use macroquad::prelude::*;
use shared::{DEFAULT_PORT, WORLD_HEIGHT, WORLD_WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the server
    #[arg(short = 's', long, default_value_t = format!("ws://127.0.0.1:{}", DEFAULT_PORT))]
    server: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Coin Arena".to_owned(),
        window_width: WORLD_WIDTH as i32,
        window_height: WORLD_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    info!("Controls: arrow keys to move");

    let mut network = match NetworkClient::connect(&args.server) {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to start client: {}", e);
            return;
        }
    };

    let mut game = ClientGameState::new();
    let mut input = InputManager::new();
    let renderer = Renderer::new(WORLD_WIDTH, WORLD_HEIGHT);

    loop {
        for event in network.poll() {
            game.apply_server_event(event);
        }

        for direction in input.update() {
            if let Some(event) = game.apply_step(direction) {
                network.send(event);
            }
        }

        renderer.render(&game, network.status());

        next_frame().await;
    }
}
