// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

mod command;

use std::path::PathBuf;

use clap::Parser;
use command::Cli;
use engine::{AutoPrompter, Engine, NullScriptHost};
use ops::{EngineValues, Operation, Registry};
use runtime::Decision;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new().filter_level(level).init();

    let exit_code = match run(cli).await {
        Ok(found_updates) => {
            if found_updates { 0 } else { 1 }
        }
        Err(err) => {
            log::error!("{err}");
            err.exit_code()
        }
    };

    std::process::exit(exit_code);
}

/// Returns whether the run found updates, for `--checkupdates`'s
/// exit-code contract; every other mode returns `true` on success so
/// it maps to exit 0.
async fn run(cli: Cli) -> Result<bool, engine::Error> {
    let exe_path = binary_data_path(&cli);

    if let Some(args) = &cli.run_operation {
        run_single_operation(args, false)?;
        return Ok(true);
    }
    if let Some(args) = &cli.undo_operation {
        run_single_operation(args, true)?;
        return Ok(true);
    }
    if cli.dump_binary_data {
        dump_binary_data(&cli, &exe_path)?;
        return Ok(true);
    }
    if cli.create_offline_repository {
        create_offline_repository(&exe_path)?;
        return Ok(true);
    }
    if let Some(new_base) = &cli.update_installerbase {
        update_installerbase(new_base, &exe_path)?;
        return Ok(true);
    }
    if cli.start_server.is_some() {
        log::warn!("--startserver is the elevated-filesystem RPC, served by an external collaborator this core doesn't implement");
        return Ok(true);
    }
    if cli.check_updates {
        return check_updates(&cli, &exe_path).await;
    }
    if let Some(script) = cli.script_path() {
        log::warn!("automation script {} named, but no script host is wired into this build", script.display());
    }

    run_default_install(&cli, &exe_path)?;
    Ok(true)
}

fn binary_data_path(cli: &Cli) -> PathBuf {
    cli.binary_data_file.clone().unwrap_or_else(|| std::env::current_exe().expect("current executable path"))
}

/// `--runoperation`/`--undooperation NAME args...`: invokes one
/// registered operation directly, outside any component or undo-log
/// context.
fn run_single_operation(args: &[String], undo: bool) -> Result<(), engine::Error> {
    let (name, arguments) = args.split_first().ok_or_else(|| {
        engine::Error::Operation(ops::OperationError::invalid("<missing>", "no operation name given"))
    })?;

    let registry = Registry::with_builtin_operations();
    let mut op = Operation::with_arguments(name.clone(), arguments.to_vec());
    let mut ctx = EngineValues::default();

    if undo {
        registry.undo(&mut op, &mut ctx)?;
    } else {
        registry.backup(&mut op, &mut ctx)?;
        registry.perform(&mut op, &mut ctx)?;
    }
    Ok(())
}

/// `--dump-binary-data -o OUT [-i IN]`: synthesizes a local repository
/// from an installer's payload via the same `CreateLocalRepository`
/// operation a component script could invoke.
fn dump_binary_data(cli: &Cli, exe_path: &PathBuf) -> Result<(), engine::Error> {
    let in_path = cli.dump_in.clone().unwrap_or_else(|| exe_path.clone());
    let out_path = cli.dump_out.clone().unwrap_or_else(|| PathBuf::from("repository"));

    let registry = Registry::with_builtin_operations();
    let mut op = Operation::with_arguments(
        ops::CREATE_LOCAL_REPOSITORY,
        vec![in_path.to_string_lossy().into_owned(), out_path.to_string_lossy().into_owned()],
    );
    let mut ctx = EngineValues::default();
    registry.backup(&mut op, &mut ctx)?;
    registry.perform(&mut op, &mut ctx)?;
    Ok(())
}

/// `--create-offline-repository`: the same synthesis, targeting a
/// fixed directory beside the running installation.
fn create_offline_repository(exe_path: &PathBuf) -> Result<(), engine::Error> {
    let out_path = exe_path
        .parent()
        .map(|dir| dir.join("offline-repository"))
        .unwrap_or_else(|| PathBuf::from("offline-repository"));

    let registry = Registry::with_builtin_operations();
    let mut op = Operation::with_arguments(
        ops::CREATE_LOCAL_REPOSITORY,
        vec![exe_path.to_string_lossy().into_owned(), out_path.to_string_lossy().into_owned()],
    );
    let mut ctx = EngineValues::default();
    registry.backup(&mut op, &mut ctx)?;
    registry.perform(&mut op, &mut ctx)?;
    Ok(())
}

/// `--update-installerbase PATH`: writes the new stub alongside the
/// running binary and hands off to the platform rename, the same
/// deferred-replace mechanism the uninstaller writer uses for its own
/// self-update.
fn update_installerbase(new_base: &PathBuf, exe_path: &PathBuf) -> Result<(), engine::Error> {
    let new_path = exe_path.with_extension("new");
    fs_err::copy(new_base, &new_path)?;
    uninstall::platform_rename().commit(&new_path, exe_path, true)?;
    Ok(())
}

async fn check_updates(cli: &Cli, exe_path: &PathBuf) -> Result<bool, engine::Error> {
    let mut engine = Engine::open(exe_path, "installer")?;
    let mut settings = engine.load_settings().await;
    for url in &cli.add_repository {
        settings.add_repository(url.clone());
    }
    for url in &cli.add_temp_repository {
        settings.add_repository(url.clone());
    }
    engine.save_settings(&settings).await?;

    let repositories: Vec<metadata::Repository> = settings
        .repositories
        .iter()
        .enumerate()
        .map(|(i, url)| metadata::Repository::new(format!("repo-{i}"), url.clone()))
        .collect();

    if repositories.is_empty() {
        return Ok(false);
    }

    let temp_root = std::env::temp_dir().join("installer-checkupdates");
    let mut job = metadata::MetadataJob::new(repositories, temp_root);
    let (handle_progress, _rx) = std::sync::mpsc::channel();
    let handle = task::Handle::new(handle_progress);

    let outcome = job.run(handle.as_ref())?;
    let found = outcome.plans.values().any(|plan| !plan.packages.is_empty());
    Ok(found)
}

fn run_default_install(cli: &Cli, exe_path: &PathBuf) -> Result<(), engine::Error> {
    let mut engine = Engine::open(exe_path, "installer")?;
    let components = engine.graph_components();
    let defaults: Vec<String> = components.iter().filter(|c| c.is_default).map(|c| c.name.clone()).collect();

    let order = engine.plan_install(&defaults)?;
    if order.is_empty() {
        log::info!("nothing to install");
        return Ok(());
    }

    let work_dir = std::env::temp_dir().join("installer-stage");
    let uninstaller_stub = exe_path.clone();
    let uninstaller_path = exe_path
        .parent()
        .map(|dir| dir.join("maintenancetool"))
        .unwrap_or_else(|| PathBuf::from("maintenancetool"));
    let packages_path = exe_path
        .parent()
        .map(|dir| dir.join("packages.xml"))
        .unwrap_or_else(|| PathBuf::from("packages.xml"));

    let scripts = NullScriptHost;
    let mut ctx = EngineValues::default();
    let prompter = AutoPrompter(if cli.no_force_installations { Decision::Ignore } else { Decision::Cancel });

    engine.install(
        &order,
        &work_dir,
        &scripts,
        &mut ctx,
        &prompter,
        &uninstaller_stub,
        &uninstaller_path,
        &packages_path,
    )?;

    Ok(())
}
