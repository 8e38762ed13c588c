//! 命令分发
//!
//! 一次只处理一条命令。`move` 的流程：
//! 快照 → 执行玩家走法 → 请求引擎 → 验证并执行引擎走法；
//! 引擎侧任何失败都恢复快照。

use chess_rules::{ChessError, Move, Piece, Side};
use tracing::{info, warn};
use uci_bridge::{CancelSignal, MoveSource};

use crate::command::Command;
use crate::error::SessionError;
use crate::session::{GameSession, GameStatus, ENGINE_SIDE, HUMAN_SIDE};
use crate::view::Orbit;

/// 一步棋的结果
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub user_move: Move,
    pub user_capture: Option<Piece>,
    /// 玩家直接将死引擎时为 None
    pub engine_move: Option<Move>,
    pub engine_capture: Option<Piece>,
    /// 走完后被将军的一方
    pub check: Option<Side>,
    pub status: GameStatus,
}

/// 命令执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Moved(MoveReport),
    Camera(Orbit),
    Light(Orbit),
    Power(f32),
    Quit,
}

/// 命令分发器
pub struct CommandDispatcher<E: MoveSource> {
    session: GameSession,
    engine: E,
    cancel: CancelSignal,
}

impl<E: MoveSource> CommandDispatcher<E> {
    pub fn new(session: GameSession, engine: E, cancel: CancelSignal) -> Self {
        Self {
            session,
            engine,
            cancel,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 解析并执行一行输入
    pub async fn dispatch(&mut self, line: &str) -> Result<Outcome, SessionError> {
        match Command::parse(line)? {
            Command::Move(text) => self.play_move(&text).await.map(Outcome::Moved),
            Command::Camera(orbit) => {
                self.session.view_mut().camera = orbit;
                info!("Camera set to {}", orbit);
                Ok(Outcome::Camera(orbit))
            }
            Command::Light(orbit) => {
                self.session.view_mut().light = orbit;
                info!("Light set to {}", orbit);
                Ok(Outcome::Light(orbit))
            }
            Command::Power(power) => {
                self.session.view_mut().light_power = power;
                info!("Light power set to {}", power);
                Ok(Outcome::Power(power))
            }
            Command::Quit => {
                self.engine.shutdown();
                Ok(Outcome::Quit)
            }
        }
    }

    async fn play_move(&mut self, text: &str) -> Result<MoveReport, SessionError> {
        // 命令开始后发出的取消都对本次引擎请求有效
        let mut cancel = self.cancel.clone();
        cancel.arm();

        if self.session.is_over() {
            return Err(ChessError::GameOver.into());
        }

        let user_move = Move::parse(text)?;
        let snapshot = self.session.snapshot();

        // 自将不检查
        let user_capture = self.session.play(&user_move, HUMAN_SIDE)?;

        let status = self.session.update_status(ENGINE_SIDE);
        if status != GameStatus::InProgress {
            info!("Checkmate after {}, player wins", user_move);
            return Ok(MoveReport {
                user_move,
                user_capture,
                engine_move: None,
                engine_capture: None,
                check: Some(ENGINE_SIDE),
                status,
            });
        }

        let reply = match self
            .engine
            .best_move(self.session.history(), &cancel)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Engine failed after {}: {}, rolling back", user_move, e);
                self.session.restore(snapshot);
                return Err(e.into());
            }
        };

        let engine_result = Move::parse(&reply)
            .and_then(|mv| self.session.play(&mv, ENGINE_SIDE).map(|capture| (mv, capture)));
        let (engine_move, engine_capture) = match engine_result {
            Ok(played) => played,
            Err(source) => {
                warn!("Engine move '{}' rejected: {}, rolling back", reply, source);
                self.session.restore(snapshot);
                return Err(SessionError::IllegalEngineMove { mv: reply, source });
            }
        };

        let status = self.session.update_status(HUMAN_SIDE);
        if status != GameStatus::InProgress {
            info!("Checkmate after {}, engine wins", engine_move);
        }
        let check = self.session.in_check(HUMAN_SIDE).then_some(HUMAN_SIDE);

        Ok(MoveReport {
            user_move,
            user_capture,
            engine_move: Some(engine_move),
            engine_capture,
            check,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chess_rules::{Board, MoveHistory, PieceType, Square};
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::io::{duplex, split, AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::task::JoinHandle;
    use uci_bridge::{CancelHandle, EngineConfig, EngineError, EngineProcess};

    use crate::error::CommandError;
    use crate::view::ViewSettings;

    /// 按顺序返回预设应答，并记录收到的历史
    struct ScriptedEngine {
        replies: VecDeque<Result<String, EngineError>>,
        seen: Vec<Vec<String>>,
        running: bool,
    }

    impl ScriptedEngine {
        fn new(replies: Vec<Result<&str, EngineError>>) -> Self {
            Self {
                replies: replies
                    .into_iter()
                    .map(|reply| reply.map(str::to_string))
                    .collect(),
                seen: Vec::new(),
                running: true,
            }
        }
    }

    #[async_trait]
    impl MoveSource for ScriptedEngine {
        async fn best_move(
            &mut self,
            history: &MoveHistory,
            _cancel: &CancelSignal,
        ) -> uci_bridge::Result<String> {
            self.seen.push(history.to_strings());
            self.replies.pop_front().unwrap_or(Err(EngineError::NoResponse))
        }

        fn is_running(&self) -> bool {
            self.running
        }

        fn shutdown(&mut self) {
            self.running = false;
        }
    }

    fn dispatcher(replies: Vec<Result<&str, EngineError>>) -> CommandDispatcher<ScriptedEngine> {
        CommandDispatcher::new(
            GameSession::default(),
            ScriptedEngine::new(replies),
            CancelSignal::never(),
        )
    }

    fn sq(name: &str) -> Square {
        Square::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_move_and_engine_reply() {
        let mut dispatcher = dispatcher(vec![Ok("e7e5")]);

        let outcome = dispatcher.dispatch("move e2e4").await.unwrap();
        let Outcome::Moved(report) = outcome else {
            panic!("expected a move outcome");
        };
        assert_eq!(report.user_move.to_string(), "e2e4");
        assert_eq!(report.engine_move.map(|mv| mv.to_string()), Some("e7e5".to_string()));
        assert_eq!(report.status, GameStatus::InProgress);
        assert_eq!(report.check, None);

        let session = dispatcher.session();
        assert_eq!(session.history().to_strings(), vec!["e2e4", "e7e5"]);
        assert_eq!(
            session.board().get(sq("e4")),
            Some(Piece::new(PieceType::Pawn, Side::White))
        );
        assert_eq!(
            session.board().get(sq("e5")),
            Some(Piece::new(PieceType::Pawn, Side::Black))
        );
        assert_eq!(dispatcher.engine().seen, vec![vec!["e2e4".to_string()]]);
    }

    #[tokio::test]
    async fn test_out_of_bounds_move_rejected() {
        let mut dispatcher = dispatcher(vec![Ok("e7e5")]);
        let before = dispatcher.session().snapshot();

        let result = dispatcher.dispatch("move e2e9").await;
        assert!(matches!(
            result,
            Err(SessionError::Move(ChessError::OutOfBounds { .. }))
        ));
        assert_eq!(dispatcher.session().snapshot(), before);
        assert!(dispatcher.engine().seen.is_empty());
    }

    #[tokio::test]
    async fn test_illegal_user_move_rejected() {
        let mut dispatcher = dispatcher(vec![]);
        let before = dispatcher.session().snapshot();

        let result = dispatcher.dispatch("move e7e5").await;
        assert!(matches!(
            result,
            Err(SessionError::Move(ChessError::NotYourPiece { .. }))
        ));
        assert_eq!(dispatcher.session().snapshot(), before);
    }

    #[tokio::test]
    async fn test_engine_rejection_rolls_back() {
        let mut dispatcher = dispatcher(vec![Err(EngineError::MoveRejected {
            fallback: "a1g1".to_string(),
        })]);
        let before = dispatcher.session().snapshot();

        let result = dispatcher.dispatch("move e2e4").await;
        let err = result.unwrap_err();
        assert!(err.is_rollback());
        assert!(matches!(err, SessionError::Engine(EngineError::MoveRejected { .. })));
        assert_eq!(dispatcher.session().snapshot(), before);
        // 引擎确实收到了玩家的走法
        assert_eq!(dispatcher.engine().seen, vec![vec!["e2e4".to_string()]]);
    }

    #[tokio::test]
    async fn test_illegal_engine_move_rolls_back() {
        let mut dispatcher = dispatcher(vec![Ok("e7e4"), Ok("zz99")]);
        let before = dispatcher.session().snapshot();

        let result = dispatcher.dispatch("move e2e4").await;
        assert!(matches!(
            result,
            Err(SessionError::IllegalEngineMove { ref mv, .. }) if mv == "e7e4"
        ));
        assert_eq!(dispatcher.session().snapshot(), before);

        let result = dispatcher.dispatch("move d2d4").await;
        assert!(matches!(result, Err(SessionError::IllegalEngineMove { .. })));
        assert_eq!(dispatcher.session().snapshot(), before);
    }

    #[tokio::test]
    async fn test_capture_rollback_restores_counters() {
        let mut board = Board::initial();
        board.move_piece(sq("d7"), sq("d3"));
        let session = GameSession::from_board(board, ViewSettings::default());
        let mut dispatcher = CommandDispatcher::new(
            session,
            ScriptedEngine::new(vec![Err(EngineError::Timeout { secs: 30 })]),
            CancelSignal::never(),
        );
        let before = dispatcher.session().snapshot();

        assert!(dispatcher.dispatch("move e2d3").await.is_err());
        assert_eq!(dispatcher.session().snapshot(), before);
        assert_eq!(dispatcher.session().layout().captured().count(Side::Black), 0);
        assert_eq!(
            dispatcher.session().layout().piece_at(sq("d3")),
            Some(Piece::new(PieceType::Pawn, Side::Black))
        );
    }

    #[tokio::test]
    async fn test_engine_mates_player() {
        let mut dispatcher = dispatcher(vec![Ok("e7e5"), Ok("d8h4")]);

        dispatcher.dispatch("move f2f3").await.unwrap();
        let outcome = dispatcher.dispatch("move g2g4").await.unwrap();
        let Outcome::Moved(report) = outcome else {
            panic!("expected a move outcome");
        };
        assert_eq!(report.status, GameStatus::Checkmate { winner: Side::Black });
        assert_eq!(report.check, Some(Side::White));

        let result = dispatcher.dispatch("move a2a3").await;
        assert!(matches!(result, Err(SessionError::Move(ChessError::GameOver))));
        assert_eq!(dispatcher.engine().seen.len(), 2);
    }

    #[tokio::test]
    async fn test_player_mates_engine_without_query() {
        // 黑王 h8 被自己的 g7、h7 兵堵住，白车 a1a8 底线将死
        let mut board = Board::empty();
        board.set(sq("h8"), Some(Piece::new(PieceType::King, Side::Black)));
        board.set(sq("g7"), Some(Piece::new(PieceType::Pawn, Side::Black)));
        board.set(sq("h7"), Some(Piece::new(PieceType::Pawn, Side::Black)));
        board.set(sq("a1"), Some(Piece::new(PieceType::Rook, Side::White)));
        board.set(sq("g1"), Some(Piece::new(PieceType::King, Side::White)));
        let session = GameSession::from_board(board, ViewSettings::default());
        let mut dispatcher =
            CommandDispatcher::new(session, ScriptedEngine::new(vec![]), CancelSignal::never());

        let outcome = dispatcher.dispatch("move a1a8").await.unwrap();
        let Outcome::Moved(report) = outcome else {
            panic!("expected a move outcome");
        };
        assert_eq!(report.engine_move, None);
        assert_eq!(report.status, GameStatus::Checkmate { winner: Side::White });
        assert!(dispatcher.engine().seen.is_empty());
    }

    #[tokio::test]
    async fn test_view_commands() {
        let mut dispatcher = dispatcher(vec![]);

        assert_eq!(
            dispatcher.dispatch("camera 45 90 30").await.unwrap(),
            Outcome::Camera(Orbit::new(45.0, 90.0, 30.0))
        );
        assert_eq!(dispatcher.session().view().camera, Orbit::new(45.0, 90.0, 30.0));

        let result = dispatcher.dispatch("light 90 0 10").await;
        assert!(matches!(
            result,
            Err(SessionError::Command(CommandError::OutOfRange { .. }))
        ));
        assert_eq!(dispatcher.session().view().light, ViewSettings::default().light);

        assert_eq!(dispatcher.dispatch("power 120").await.unwrap(), Outcome::Power(120.0));
        assert_eq!(dispatcher.session().view().light_power, 120.0);
    }

    #[tokio::test]
    async fn test_quit_shuts_engine_down() {
        let mut dispatcher = dispatcher(vec![]);
        assert_eq!(dispatcher.dispatch("quit").await.unwrap(), Outcome::Quit);
        assert!(!dispatcher.engine().is_running());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut dispatcher = dispatcher(vec![]);
        let before = dispatcher.session().snapshot();
        assert!(matches!(
            dispatcher.dispatch("resign").await,
            Err(SessionError::Command(CommandError::UnknownCommand { .. }))
        ));
        assert_eq!(dispatcher.session().snapshot(), before);
    }

    /// 等待取消或 5 秒后给出 e7e5
    struct WaitingEngine;

    #[async_trait]
    impl MoveSource for WaitingEngine {
        async fn best_move(
            &mut self,
            _history: &MoveHistory,
            cancel: &CancelSignal,
        ) -> uci_bridge::Result<String> {
            let mut cancel = cancel.clone();
            tokio::select! {
                _ = cancel.cancelled() => Err(EngineError::Cancelled),
                _ = tokio::time::sleep(Duration::from_secs(5)) => Ok("e7e5".to_string()),
            }
        }

        fn is_running(&self) -> bool {
            true
        }

        fn shutdown(&mut self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_command_is_ignored() {
        let handle = CancelHandle::new();
        let mut dispatcher =
            CommandDispatcher::new(GameSession::default(), WaitingEngine, handle.signal());

        // 空闲时按下的取消不影响下一条命令
        handle.cancel();
        dispatcher.dispatch("move e2e4").await.unwrap();
        assert_eq!(
            dispatcher.session().history().to_strings(),
            vec!["e2e4", "e7e5"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_engine_wait_rolls_back() {
        let handle = CancelHandle::new();
        let mut dispatcher =
            CommandDispatcher::new(GameSession::default(), WaitingEngine, handle.signal());
        let before = dispatcher.session().snapshot();

        let trigger = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result = dispatcher.dispatch("move e2e4").await;
        assert!(matches!(
            result,
            Err(SessionError::Engine(EngineError::Cancelled))
        ));
        assert_eq!(dispatcher.session().snapshot(), before);
    }

    /// 基于 duplex 的引擎进程：收到 `go` 后写出 `output`，返回收到的命令
    fn engine_over_duplex(output: &'static str) -> (EngineProcess, JoinHandle<Vec<String>>) {
        let (ours, theirs) = duplex(1024);
        let (reader, writer) = split(ours);

        let fake = tokio::spawn(async move {
            let (engine_in, mut engine_out) = split(theirs);
            let mut lines = BufReader::new(engine_in).lines();
            let mut received = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                let is_go = line.starts_with("go");
                received.push(line);
                if is_go {
                    break;
                }
            }
            engine_out.write_all(output.as_bytes()).await.unwrap();
            engine_out.flush().await.unwrap();
            received
        });

        let engine = EngineProcess::from_streams(reader, writer, EngineConfig::default());
        (engine, fake)
    }

    #[tokio::test]
    async fn test_end_to_end_with_engine_process() {
        let (engine, fake) =
            engine_over_duplex("info depth 7 score cp 12\nbestmove e7e5 ponder g1f3\n");
        let mut dispatcher =
            CommandDispatcher::new(GameSession::default(), engine, CancelSignal::never());

        dispatcher.dispatch("move e2e4").await.unwrap();
        assert_eq!(
            dispatcher.session().history().to_strings(),
            vec!["e2e4", "e7e5"]
        );

        let received = fake.await.unwrap();
        assert_eq!(received, vec!["position startpos moves e2e4", "go depth 7"]);
    }

    #[tokio::test]
    async fn test_end_to_end_engine_rejection_rolls_back() {
        let (engine, fake) = engine_over_duplex("info depth 1\nCannot execute move\n");
        let mut dispatcher =
            CommandDispatcher::new(GameSession::default(), engine, CancelSignal::never());
        let before = dispatcher.session().snapshot();

        let result = dispatcher.dispatch("move e2e4").await;
        match result {
            Err(SessionError::Engine(EngineError::MoveRejected { fallback })) => {
                assert_eq!(fallback, "a1g1")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(dispatcher.session().snapshot(), before);
        assert!(dispatcher.session().history().is_empty());
        assert_eq!(
            dispatcher.session().board().get(sq("e2")),
            Some(Piece::new(PieceType::Pawn, Side::White))
        );

        let received = fake.await.unwrap();
        assert_eq!(received, vec!["position startpos moves e2e4", "go depth 7"]);
    }
}
