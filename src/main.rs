mod cli;
mod config;
mod game;
mod msg;
mod net;
mod persistence;
mod rules;
mod systems;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use game::{ClientMessage, GameServer, ServerMessage};
use net::connection::handle_connection;
use persistence::npc_repo::{FileNpcDataRepository, NpcDataRepository};
use persistence::session::{FileSessionService, SessionService};
use persistence::FileCharacterRepository;
use rules::{load_world_rules, load_xp_table, WorldRules, XpTable, ZoneConfig};

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

fn data_root() -> PathBuf {
    std::env::var("REQ_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn config_root() -> PathBuf {
    std::env::var("REQ_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    let cli_config = match cli::parse_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            error!("invalid command line: {e}");
            std::process::exit(1);
        }
    };

    let config_dir = config_root();
    let data_dir = data_root();

    let zone_config = match ZoneConfig::new(cli_config.zone_id, cli_config.zone_name.clone())
        .load_overrides(&config_dir.join("world.json"))
    {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load zone config overrides: {e}");
            std::process::exit(1);
        }
    };

    let world_rules_path = config_dir.join("world_rules.json");
    let world_rules: WorldRules = if world_rules_path.exists() {
        match load_world_rules(&world_rules_path) {
            Ok(r) => r,
            Err(e) => {
                error!("failed to load world rules from {}: {e}", world_rules_path.display());
                std::process::exit(1);
            }
        }
    } else {
        info!("no world rules file at {}, using defaults", world_rules_path.display());
        WorldRules::default()
    };

    let xp_table_path = config_dir.join("xp_table.json");
    let xp_table: XpTable = match load_xp_table(&xp_table_path) {
        Ok(t) => t,
        Err(e) => {
            error!("failed to load xp table from {}: {e}", xp_table_path.display());
            std::process::exit(1);
        }
    };

    let mut npc_repo = FileNpcDataRepository::new();
    npc_repo.load_templates(&config_dir.join("npc_templates.json"));
    npc_repo.load_zone_spawns(
        &config_dir
            .join("zones")
            .join(format!("npc_spawns_{}.json", cli_config.zone_id)),
    );
    info!(
        "[NPC] loaded {} templates, {} spawn points",
        npc_repo.template_count(),
        npc_repo.spawn_count()
    );

    let character_repo = FileCharacterRepository::new(persistence::characters_dir(&data_dir));

    let mut session_service = FileSessionService::new(persistence::session::sessions_path(&data_dir));
    if !session_service.reload_from_file() {
        info!("starting with an empty session cache");
    }

    let addr = format!("{}:{}", cli_config.address, cli_config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "Zone '{}' (world {}, zone {}) listening on {addr}",
        zone_config.zone_name, cli_config.world_id, cli_config.zone_id
    );
    info!(
        "Tick rate: {} Hz ({}ms)",
        config::TICK_RATE_HZ,
        config::TICK_INTERVAL_MS
    );

    let (game_tx, game_rx) = mpsc::unbounded_channel::<ClientMessage>();
    let game_tx_for_accept = game_tx.clone();

    let (new_conn_tx, mut new_conn_rx) =
        mpsc::unbounded_channel::<(u64, mpsc::UnboundedSender<ServerMessage>)>();

    let _game_handle = tokio::spawn(async move {
        let mut server = GameServer::new(
            &cli_config,
            zone_config,
            Box::new(character_repo),
            Box::new(npc_repo),
            Box::new(session_service),
            world_rules,
            xp_table,
            game_rx,
        );

        let mut interval =
            tokio::time::interval(std::time::Duration::from_millis(config::TICK_INTERVAL_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let shutdown_rx = tokio::signal::ctrl_c();
        tokio::pin!(shutdown_rx);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received, saving all players...");
                    server.save_all_players();
                    info!("All players saved. Shutting down.");
                    break;
                }
            }

            while let Ok((conn_id, tx)) = new_conn_rx.try_recv() {
                server.add_connection(conn_id, tx);
            }

            server.run_tick();
        }
    });

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Accept error: {e}");
                continue;
            }
        };

        let conn_id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
        info!("New connection {conn_id} from {peer_addr}");

        let (conn_tx, conn_rx) = mpsc::unbounded_channel::<ServerMessage>();
        let _ = new_conn_tx.send((conn_id, conn_tx));

        let game_tx_clone = game_tx_for_accept.clone();
        tokio::spawn(async move {
            handle_connection(stream, conn_id, game_tx_clone, conn_rx).await;
        });
    }
}
