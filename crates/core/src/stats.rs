//! Simulation statistics collection and reporting.
//!
//! This module gathers the counters kept by each layer into one report. It provides:
//! 1. **Summary:** Simulated time reached, host time, instructions and events processed.
//! 2. **Threads:** Creation, reaping, disabling and wake-ups of VM threads.
//! 3. **Network:** Value deliveries, filtered sends, resolver work and event wake-ups.

use std::time::Instant;

use serde::Serialize;

use crate::net::NetStats;

/// Counters kept by the VM.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VmStats {
    /// Instructions executed.
    pub instructions: u64,
    /// Threads created by the start list and by `%fork`.
    pub threads_created: u64,
    /// Threads deleted.
    pub threads_reaped: u64,
    /// Threads ended by `%disable` or `%disable/fork`.
    pub threads_disabled: u64,
    /// Times a thread was resumed.
    pub thread_wakeups: u64,
    /// Deepest vector stack seen in a reaped or suspended thread.
    pub peak_vec4_depth: u64,
}

/// Simulation statistics for one run.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Simulated time when the statistics were taken.
    pub sim_time: u64,
    /// Scheduler events dispatched.
    pub events_processed: u64,
    /// Non-blocking assignments applied.
    pub assignments: u64,
    /// VM counters.
    pub vm: VmStats,
    /// Network counters.
    pub network: NetStats,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            sim_time: 0,
            events_processed: 0,
            assignments: 0,
            vm: VmStats::default(),
            network: NetStats::default(),
        }
    }
}

/// Section names accepted by [`SimStats::print_sections`].
pub const STATS_SECTIONS: &[&str] = &["summary", "threads", "network"];

impl SimStats {
    /// Serializes the statistics as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates [`serde_json::Error`]; the schema itself always serializes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Prints every section.
    pub fn print(&self) {
        self.print_sections(&[]);
    }

    /// Prints the named sections (all of them when `sections` is empty).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();

        if want("summary") {
            let ips = if seconds > 0.0 { self.vm.instructions as f64 / seconds } else { 0.0 };
            println!("\n==========================================================");
            println!("VERILOG SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_time                 {}", self.sim_time);
            println!("sim_events               {}", self.events_processed);
            println!("sim_assignments          {}", self.assignments);
            println!("sim_insts                {}", self.vm.instructions);
            println!("sim_insts_per_sec        {ips:.0}");
            println!("----------------------------------------------------------");
        }
        if want("threads") {
            println!("THREADS");
            println!("  threads.created        {}", self.vm.threads_created);
            println!("  threads.reaped         {}", self.vm.threads_reaped);
            println!("  threads.disabled       {}", self.vm.threads_disabled);
            println!("  threads.wakeups        {}", self.vm.thread_wakeups);
            println!("  stack.vec4_peak        {}", self.vm.peak_vec4_depth);
            println!("----------------------------------------------------------");
        }
        if want("network") {
            let updates = self.network.resolver_updates.max(1);
            let short = self.network.resolver_short_circuits;
            println!("NETWORK");
            println!("  net.deliveries         {}", self.network.deliveries);
            println!("  net.filtered           {}", self.network.filtered);
            println!("  resolv.updates         {}", self.network.resolver_updates);
            println!(
                "  resolv.short_circuits  {} ({:.2}%)",
                short,
                (short as f64 / updates as f64) * 100.0
            );
            println!("  event.wakeups          {}", self.network.event_wakeups);
            println!("==========================================================");
        }
    }
}
