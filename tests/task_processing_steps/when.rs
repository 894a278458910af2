//! When steps for background task processing BDD scenarios.

use super::world::{TaskProcessingWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use tasktrack::task::domain::{TaskId, TaskStatus};

#[when("the task is processed to completion")]
fn process_to_completion(world: &mut TaskProcessingWorld) -> Result<(), eyre::Report> {
    let id = world.task()?.id();
    let handle = run_async(world.processor.start_existing(id)).wrap_err("start processing")?;
    world.handle = Some(handle);
    world.finish_run()?;
    world.refresh_task()
}

#[when("processing is requested again")]
fn request_again(world: &mut TaskProcessingWorld) -> Result<(), eyre::Report> {
    let id = world.task()?.id();
    let result = run_async(world.processor.start_existing(id));
    world.last_start = Some(result.map(drop));
    Ok(())
}

#[when("processing is requested for an unknown task")]
fn request_unknown(world: &mut TaskProcessingWorld) {
    let result = run_async(world.processor.start_existing(TaskId::new()));
    world.last_start = Some(result.map(drop));
}

#[when("the held run is released")]
fn release_held_run(world: &mut TaskProcessingWorld) -> Result<(), eyre::Report> {
    world.work.release_one();
    world.finish_run()?;
    world.refresh_task()
}

#[when(r#"the task status is set to "{status}" twice"#)]
fn set_status_twice(world: &mut TaskProcessingWorld, status: String) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())?;
    let id = world.task()?.id();
    for _ in 0..2 {
        let updated = run_async(world.service.set_status(id, target))
            .wrap_err("set task status")?;
        world.task = Some(updated);
    }
    Ok(())
}
