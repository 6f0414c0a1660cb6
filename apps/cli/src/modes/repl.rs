//! REPL 模式（交互式 Shell）
//!
//! 一个会话贯穿整个 Shell，Servodrive 使能状态在命令之间保持。
//! 每行按与 One-shot 相同的命令定义解析。

use anyhow::Result;
use clap::{CommandFactory, Parser};
use mcm_sdk::{Session, Transport};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::GlobalArgs;
use crate::commands::DeviceCommand;
use crate::modes::open_session;
use crate::output::OutputFormat;

const HISTORY_FILE: &str = ".mcm_history";

/// Shell 中的一行命令
#[derive(Parser, Debug)]
#[command(name = "mcm", no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    /// 本条命令跳过 Servodrive 模式检查
    #[arg(long)]
    force: bool,

    /// 本条命令的输出格式
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: DeviceCommand,
}

/// 处理一行之后的去向
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// 运行 REPL 模式
pub fn run_repl(global: &GlobalArgs) -> Result<()> {
    let mut session = open_session(global)?;
    let mut rl = DefaultEditor::new()?;
    rl.load_history(HISTORY_FILE).ok(); // 首次运行没有历史文件

    println!("MCM CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
    println!("输入 'help' 查看帮助，'exit' 退出");
    println!();

    loop {
        let prompt = if session.mode().is_enabled() {
            "mcm[servo]> "
        } else {
            "mcm> "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match handle_line(line, &mut session, global) {
                    Ok(Flow::Continue) => {},
                    Ok(Flow::Exit) => break,
                    Err(err) => eprintln!("❌ Error: {err:#}"),
                }
            },

            Err(ReadlineError::Interrupted) => {
                // Ctrl+C：闭环控制中视为急停
                println!("^C");
                if session.mode().is_enabled() {
                    eprintln!("🛑 Emergency stop");
                    if let Err(err) = session.servodrive_emergency_stop(false) {
                        warn!("Emergency stop failed: {err}");
                    }
                }
            },

            Err(ReadlineError::Eof) => break,

            Err(err) => {
                rl.save_history(HISTORY_FILE).ok();
                return Err(err.into());
            },
        }
    }

    rl.save_history(HISTORY_FILE).ok();
    println!("👋 再见！");
    Ok(())
}

fn handle_line<T: Transport>(
    line: &str,
    session: &mut Session<T>,
    global: &GlobalArgs,
) -> Result<Flow> {
    match line {
        "exit" | "quit" => return Ok(Flow::Exit),
        "help" => {
            println!("{}", ReplLine::command().render_help());
            println!("Shell 命令: mode, pending, help, exit");
            return Ok(Flow::Continue);
        },
        "mode" => {
            println!("servodrive: {}", session.mode());
            return Ok(Flow::Continue);
        },
        "pending" => {
            println!("{}", session.pending_commands());
            return Ok(Flow::Continue);
        },
        _ => {},
    }

    let parsed = match ReplLine::try_parse_from(line.split_whitespace()) {
        Ok(parsed) => parsed,
        Err(err) => {
            // 用法错误和 --help 都只打印，不中断 Shell
            err.print()?;
            return Ok(Flow::Continue);
        },
    };

    let output = parsed
        .command
        .execute(session, global.force || parsed.force)?;
    output.print(parsed.format.unwrap_or(global.format))?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcm_sdk::transport::{MockReply, MockTransport};
    use mcm_sdk::{ModeState, SessionBuilder};

    fn session() -> (Session<MockTransport>, MockTransport) {
        let mock = MockTransport::new();
        let session = SessionBuilder::new().build_with(mock.clone()).unwrap();
        (session, mock)
    }

    #[test]
    fn test_mode_persists_across_lines() {
        let (mut session, mock) = session();
        let global = GlobalArgs::default();

        assert_eq!(
            handle_line("servo enable", &mut session, &global).unwrap(),
            Flow::Continue
        );
        assert_eq!(session.mode(), ModeState::Enabled);

        handle_line("servo go-to 10 -20 0", &mut session, &global).unwrap();
        assert!(handle_line("status 1", &mut session, &global).is_err());

        mock.push_reply(MockReply::ok("POS : 5\nRVL : 50"));
        handle_line("--force position 1", &mut session, &global).unwrap();

        handle_line("servo disable", &mut session, &global).unwrap();
        assert_eq!(session.mode(), ModeState::Disabled);

        let codes: Vec<String> = mock.invocations().into_iter().map(|a| a[1].clone()).collect();
        assert_eq!(codes, vec!["FBEN", "FBCS", "POS", "FBXT"]);
    }

    #[test]
    fn test_parse_errors_do_not_exit() {
        let (mut session, mock) = session();
        let global = GlobalArgs::default();
        assert_eq!(
            handle_line("move 1 sideways", &mut session, &global).unwrap(),
            Flow::Continue
        );
        assert_eq!(
            handle_line("nonsense", &mut session, &global).unwrap(),
            Flow::Continue
        );
        assert_eq!(mock.invocation_count(), 0);
    }

    #[test]
    fn test_builtins() {
        let (mut session, _mock) = session();
        let global = GlobalArgs::default();
        assert_eq!(handle_line("mode", &mut session, &global).unwrap(), Flow::Continue);
        assert_eq!(handle_line("quit", &mut session, &global).unwrap(), Flow::Exit);
        assert_eq!(handle_line("exit", &mut session, &global).unwrap(), Flow::Exit);
    }
}
