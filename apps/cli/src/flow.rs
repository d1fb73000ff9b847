//! Sub-commands forwarded to `flow`.

use anyhow::Result;
use neogrove_runexec::run_flow;
use tracing::debug;

use crate::PlanCommand;

pub fn chat(file_path: &str) -> Result<()> {
    debug!(file_path, "starting chat run");
    delegate(vec!["run".to_string(), file_path.to_string()])
}

pub fn plan(command: PlanCommand) -> Result<()> {
    delegate(plan_args(command))
}

pub fn models_list(args: Vec<String>) -> Result<()> {
    let mut flow_args = vec!["models".to_string()];
    flow_args.extend(args);
    delegate(flow_args)
}

fn delegate(args: Vec<String>) -> Result<()> {
    debug!(?args, "delegating to flow");
    run_flow(args)?;
    Ok(())
}

fn plan_args(command: PlanCommand) -> Vec<String> {
    let mut args = vec!["plan".to_string()];
    match command {
        PlanCommand::Init(init) => {
            args.push("init".into());
            args.extend(init.dir);
            if let Some(file) = init.extract_all_from.filter(|file| !file.is_empty()) {
                args.extend(["--extract-all-from".into(), file]);
            }
        }
        PlanCommand::List(rest) => {
            args.push("list".into());
            args.extend(rest.args);
        }
        PlanCommand::Status(status) => {
            args.extend(["status".into(), status.plan]);
            args.extend(status.flags.into_iter().filter(|flag| flag.starts_with('-')));
        }
        PlanCommand::Add(target) => {
            args.extend(["add".into(), target.plan, "-i".into()]);
        }
        PlanCommand::Run(target) => {
            args.extend(["run".into(), target.plan]);
        }
        PlanCommand::TemplateList(rest) => {
            args.extend(["templates".into(), "list".into()]);
            args.extend(rest.args);
        }
        PlanCommand::Config(config) => {
            args.extend(["config".into(), config.plan]);
            if let Some(key) = config.get.filter(|key| !key.is_empty()) {
                args.extend(["--get".into(), key]);
            }
            for assignment in config.set {
                args.extend(["--set".into(), assignment]);
            }
        }
    }
    args
}
