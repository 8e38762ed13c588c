use std::path::PathBuf;

use anyhow::Result;
use chess_session::{
    CommandDispatcher, GameSession, GameStatus, MoveReport, Outcome, SessionSettings, HUMAN_SIDE,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uci_bridge::{CancelHandle, EngineProcess};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，不与对局输出混在一起）
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_session=info".parse()?)
                .add_directive("uci_bridge=info".parse()?)
                .add_directive("chess_rules=warn".parse()?),
        )
        .init();

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(SessionSettings::settings_path);
    let mut settings = SessionSettings::load(settings_path.clone());
    info!("国际象棋会话启动中...");

    let mut engine = EngineProcess::new(settings.engine.clone());
    if let Err(e) = engine.initialize().await {
        warn!("引擎未启动，走棋将失败: {}", e);
    }

    let cancel = CancelHandle::new();
    let mut dispatcher =
        CommandDispatcher::new(GameSession::new(settings.view), engine, cancel.signal());

    println!("{}", dispatcher.session().board());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        // Ctrl-C 取消正在进行的引擎请求，命令本身仍走完回滚流程
        let result = {
            let dispatch = dispatcher.dispatch(&line);
            tokio::pin!(dispatch);
            loop {
                tokio::select! {
                    result = &mut dispatch => break result,
                    _ = tokio::signal::ctrl_c() => {
                        warn!("Cancelling engine request");
                        cancel.cancel();
                    }
                }
            }
        };

        match result {
            Ok(Outcome::Moved(report)) => {
                print_report(&report);
                println!("{}", dispatcher.session().board());
            }
            Ok(Outcome::Camera(orbit)) => println!("Camera: {}", orbit),
            Ok(Outcome::Light(orbit)) => println!("Light: {}", orbit),
            Ok(Outcome::Power(power)) => println!("Light power: {}", power),
            Ok(Outcome::Quit) => break,
            Err(e) if e.is_rollback() => println!("Error: {}", e),
            Err(e) => println!("Invalid command or move!! {}", e),
        }
    }

    // 保存本局调整过的相机与灯光
    if let Some(path) = &settings_path {
        if let Err(e) = settings.persist_view(dispatcher.session().view(), path) {
            warn!("保存设置失败: {:#}", e);
        }
    }

    println!("Thanks for playing!");
    Ok(())
}

fn print_report(report: &MoveReport) {
    match report.engine_move {
        Some(mv) => println!("You: {}  Engine: {}", report.user_move, mv),
        None => println!("You: {}", report.user_move),
    }

    match report.status {
        GameStatus::Checkmate { winner } if winner == HUMAN_SIDE => println!("Checkmate! You win."),
        GameStatus::Checkmate { .. } => println!("Checkmate! Engine wins."),
        GameStatus::InProgress => {
            if report.check == Some(HUMAN_SIDE) {
                println!("Check!");
            }
        }
    }
}
