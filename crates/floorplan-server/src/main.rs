use floorplan_ai::GatewayConfig;
use floorplan_scene::SceneStore;
use floorplan_server::{AppState, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let provider = GatewayConfig::from_env()?.into_provider();
    let scene_path =
        std::env::var("FLOORPLAN_SCENE_PATH").unwrap_or_else(|_| "scene.json".to_string());
    let address = std::env::var("FLOORPLAN_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let state = AppState::new(provider, SceneStore::new(scene_path));
    let listener = tokio::net::TcpListener::bind(&address).await?;
    log::info!("floor-plan server listening on {address}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
