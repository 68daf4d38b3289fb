//! Deterministic time-sliced execution of the two SH2 cores.
//!
//! Each slice grants both CPUs the same cycle budget and runs them one after the other on the
//! calling thread. A CPU the poll detector reports as spinning has its slice consumed without
//! running, which is where polling detection pays off.

use std::sync::Arc;

use mars_events::{PollDetector, SysEventManager};
use mars_sh2::{CpuId, Sh2Context};

use crate::config::SmpConfig;
use crate::error::{Result, SmpError};

/// The interpreter or recompiler driving one core.
///
/// `run` is called with `ctx.cycles` set to the slice budget and `ctx.cycles_ran` at zero, and
/// should return once `ctx.cycles_ran` reaches the budget (or it has nothing left to do).
pub trait Sh2Executor {
    fn run(&mut self, ctx: &mut Sh2Context);
}

impl<F: FnMut(&mut Sh2Context)> Sh2Executor for F {
    fn run(&mut self, ctx: &mut Sh2Context) {
        self(ctx)
    }
}

/// Outcome of one [`DualSh2Scheduler::run_slice`], indexed by [`CpuId::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceReport {
    pub ran: [i32; 2],
    pub skipped: [bool; 2],
}

pub struct DualSh2Scheduler {
    config: SmpConfig,
    events: Arc<SysEventManager>,
    poller: Option<Arc<PollDetector>>,
    slices: u64,
    total_cycles: [u64; 2],
}

impl DualSh2Scheduler {
    pub fn new(config: SmpConfig, events: Arc<SysEventManager>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            events,
            poller: None,
            slices: 0,
            total_cycles: [0; 2],
        })
    }

    /// Like [`DualSh2Scheduler::new`], also attaching a [`PollDetector`] configured from
    /// `config.poll` to `events`.
    pub fn with_poll_detection(config: SmpConfig, events: Arc<SysEventManager>) -> Result<Self> {
        let mut scheduler = Self::new(config, events)?;
        let poller = PollDetector::attach(&scheduler.events, scheduler.config.poll.clone())?;
        scheduler.poller = Some(poller);
        Ok(scheduler)
    }

    pub fn config(&self) -> &SmpConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<SysEventManager> {
        &self.events
    }

    pub fn poller(&self) -> Option<&Arc<PollDetector>> {
        self.poller.as_ref()
    }

    pub fn slices(&self) -> u64 {
        self.slices
    }

    pub fn total_cycles(&self, cpu: CpuId) -> u64 {
        self.total_cycles[cpu.index()]
    }

    /// Runs both CPUs for one slice in the configured order.
    pub fn run_slice(
        &mut self,
        master: &mut Sh2Context,
        slave: &mut Sh2Context,
        exec: &mut impl Sh2Executor,
    ) -> Result<SliceReport> {
        check_slot(CpuId::Master, master)?;
        check_slot(CpuId::Slave, slave)?;

        let mut report = SliceReport::default();
        for cpu in self.config.order() {
            let ctx = match cpu {
                CpuId::Master => &mut *master,
                CpuId::Slave => &mut *slave,
            };
            ctx.grant(self.config.slice_cycles);

            if self.should_skip(cpu) {
                ctx.cycles_ran = ctx.cycles;
                report.skipped[cpu.index()] = true;
                tracing::debug!(cpu = %cpu, cycles = ctx.cycles, "slice skipped while polling");
            } else {
                exec.run(ctx);
                if ctx.cycles_ran <= 0 {
                    tracing::warn!(cpu = %cpu, pc = ctx.pc, "executor made no progress");
                }
            }

            report.ran[cpu.index()] = ctx.cycles_ran;
            self.total_cycles[cpu.index()] += u64::try_from(ctx.cycles_ran).unwrap_or(0);
        }
        self.slices += 1;
        Ok(report)
    }

    pub fn run_slices(
        &mut self,
        slices: u64,
        master: &mut Sh2Context,
        slave: &mut Sh2Context,
        exec: &mut impl Sh2Executor,
    ) -> Result<()> {
        for _ in 0..slices {
            self.run_slice(master, slave, exec)?;
        }
        Ok(())
    }

    fn should_skip(&self, cpu: CpuId) -> bool {
        self.config.skip_polling
            && self
                .poller
                .as_ref()
                .is_some_and(|poller| poller.is_polling(cpu))
    }
}

fn check_slot(expected: CpuId, ctx: &Sh2Context) -> Result<()> {
    if ctx.cpu() != expected {
        return Err(SmpError::WrongContext {
            expected,
            got: ctx.cpu(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swapped_contexts_are_rejected() {
        let mut scheduler =
            DualSh2Scheduler::new(SmpConfig::default(), Arc::new(SysEventManager::new())).unwrap();
        let mut master = Sh2Context::new(CpuId::Master);
        let mut slave = Sh2Context::new(CpuId::Slave);
        let mut exec = |ctx: &mut Sh2Context| ctx.cycles_ran = ctx.cycles;
        let err = scheduler
            .run_slice(&mut slave, &mut master, &mut exec)
            .unwrap_err();
        assert_eq!(
            err,
            SmpError::WrongContext {
                expected: CpuId::Master,
                got: CpuId::Slave
            }
        );
        assert_eq!(scheduler.slices(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SmpConfig {
            slice_cycles: -4,
            ..SmpConfig::default()
        };
        let err = DualSh2Scheduler::new(config, Arc::new(SysEventManager::new()))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "invalid smp config: slice_cycles must be positive (got -4)");
    }
}
