use vsim_core::common::NetId;
use vsim_core::net::{Network, SignalFun, Value};
use vsim_core::resolv::{Pull, TriFun, WiredFun, WiredOp, link_drivers};
use vsim_core::sched::Scheduler;
use vsim_core::logic::Vec4;
use vsim_core::logic::literal::parse_bits;

/// A resolved net: driver variables, the resolver and a probe signal holding the result.
#[derive(Debug)]
pub struct ResolvedNet {
    pub drivers: Vec<NetId>,
    pub resolver: NetId,
    pub probe: NetId,
}

impl ResolvedNet {
    /// Drives driver `idx` with a `01xz` literal.
    pub fn drive(&self, net: &mut Network, sched: &mut dyn Scheduler, idx: usize, bits: &str) {
        let v = parse_bits(bits).unwrap();
        net.deliver(self.drivers[idx].port(0), &Value::Vec4(v), sched);
    }

    /// The resolved value as 4-state text.
    pub fn value(&self, net: &Network) -> String {
        net.read_vec4(self.probe).to_string()
    }
}

fn with_drivers(net: &mut Network, resolver: NetId, width: u32, count: usize, probe: SignalFun) -> ResolvedNet {
    let drivers: Vec<NetId> = (0..count).map(|_| net.add(SignalFun::variable_vec4(width))).collect();
    let pairs: Vec<(NetId, u32)> = drivers.iter().map(|&d| (d, width)).collect();
    link_drivers(net, resolver, &pairs).unwrap();
    let probe = net.add(probe);
    net.link(resolver, probe.port(0)).unwrap();
    ResolvedNet { drivers, resolver, probe }
}

/// A tri-state net of `width` bits with `count` drivers.
pub fn tri_net(net: &mut Network, width: u32, count: usize, pull: Pull) -> ResolvedNet {
    let resolver = net.add(TriFun::new(width, count, pull));
    with_drivers(net, resolver, width, count, SignalFun::net_vec8(width))
}

/// A wired-AND or wired-OR net of `width` bits with `count` drivers.
pub fn wired_net(net: &mut Network, op: WiredOp, width: u32, count: usize) -> ResolvedNet {
    let resolver = net.add(WiredFun::new(op, width, count));
    with_drivers(net, resolver, width, count, SignalFun::net_vec4(width))
}

/// Adds a 4-state net that records whatever `from` sends.
pub fn probe(net: &mut Network, from: NetId, width: u32) -> NetId {
    let p = net.add(SignalFun::net_vec4(width));
    net.link(from, p.port(0)).unwrap();
    p
}

/// Delivers a `01xz` literal into port `port` of `to`.
pub fn poke(net: &mut Network, sched: &mut dyn Scheduler, to: NetId, port: u8, bits: &str) {
    let v: Vec4 = parse_bits(bits).unwrap();
    net.deliver(to.port(port), &Value::Vec4(v), sched);
}
