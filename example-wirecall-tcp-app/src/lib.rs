//! Services and wiring shared by the demo binary and the benchmark.

use example_wirecall_rpc_service_definition::{Add, Div, DivArgs, Mult, Say};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use wirecall_tokio_rpc_server::{BoxError, MethodSet, RpcService, ServiceRegistry};

/// Answers `Echo.Say` and counts how often it was asked.
#[derive(Default)]
pub struct Echo {
    calls: AtomicU64,
}

impl Echo {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl RpcService for Echo {
    fn register_methods(methods: &mut MethodSet<Self>) {
        methods.add::<Say, _, _>(|this, ctx, text| async move {
            this.calls.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Say from {:?}", ctx.peer_addr());
            Ok(text)
        });
    }
}

pub struct Arith;

impl RpcService for Arith {
    fn register_methods(methods: &mut MethodSet<Self>) {
        methods
            .add::<Add, _, _>(|_this, _ctx, numbers| async move { Ok(numbers.iter().sum()) })
            .add::<Mult, _, _>(|_this, _ctx, numbers| async move { Ok(numbers.iter().product()) })
            .add::<Div, _, _>(|_this, _ctx, args: DivArgs| async move {
                if args.divisor == 0.0 {
                    return Err(BoxError::from("divide by zero"));
                }
                Ok(args.dividend / args.divisor)
            });
    }
}

/// A registry with `Echo` and `Arith` registered.
pub fn build_registry() -> Result<Arc<ServiceRegistry>, BoxError> {
    let registry = Arc::new(ServiceRegistry::new());
    registry.register(Arc::new(Echo::default()))?;
    registry.register(Arc::new(Arith))?;
    Ok(registry)
}
