use crate::{
    RpcContext,
    error::{BoxError, DispatchError, InvokeError, RegistrationError},
};
use futures::future::{BoxFuture, FutureExt};
use std::{
    any::{Any, type_name},
    collections::{HashMap, hash_map::Entry},
    fmt,
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};
use wirecall::frame::CodecType;
use wirecall_rpc_service::{RpcMethod, is_exported_identifier, split_service_method};

type MethodHandler = Arc<
    dyn Fn(RpcContext, Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, InvokeError>> + Send + Sync,
>;

/// Calling-convention metadata for one registered method.
///
/// Built once when its service is registered and never changed afterwards.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: &'static str,
    codec: CodecType,
    arg_type: &'static str,
    reply_type: &'static str,
    handler: MethodHandler,
}

impl MethodDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Codec tag the method's payloads are expected to carry.
    pub fn codec(&self) -> CodecType {
        self.codec
    }

    pub fn arg_type(&self) -> &'static str {
        self.arg_type
    }

    pub fn reply_type(&self) -> &'static str {
        self.reply_type
    }

    /// Decodes `payload` into the argument, runs the handler and encodes its reply.
    pub async fn invoke(&self, ctx: RpcContext, payload: Vec<u8>) -> Result<Vec<u8>, InvokeError> {
        (self.handler)(ctx, payload).await
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("codec", &self.codec)
            .field("arg_type", &self.arg_type)
            .field("reply_type", &self.reply_type)
            .finish_non_exhaustive()
    }
}

/// A registered receiver and the methods published from it.
pub struct Service {
    name: String,
    receiver: Arc<dyn Any + Send + Sync>,
    methods: HashMap<&'static str, MethodDescriptor>,
}

impl Service {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> Arc<dyn Any + Send + Sync> {
        self.receiver.clone()
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Implemented by any type that publishes RPC methods.
///
/// `register_methods` lists the methods once, at registration time. Each
/// handler receives the shared receiver, the call context and the decoded
/// argument, and returns the reply or an error:
///
/// ```ignore
/// impl RpcService for EchoService {
///     fn register_methods(methods: &mut MethodSet<Self>) {
///         methods.add::<Say, _, _>(|this, _ctx, text| async move { this.say(text) });
///     }
/// }
/// ```
pub trait RpcService: Send + Sync + 'static {
    fn register_methods(methods: &mut MethodSet<Self>)
    where
        Self: Sized;
}

/// Collects the methods of one receiver during registration.
pub struct MethodSet<S> {
    receiver: Arc<S>,
    methods: HashMap<&'static str, MethodDescriptor>,
    excluded: Vec<String>,
}

impl<S> MethodSet<S>
where
    S: Send + Sync + 'static,
{
    fn new(receiver: Arc<S>) -> Self {
        Self {
            receiver,
            methods: HashMap::new(),
            excluded: Vec::new(),
        }
    }

    /// Publishes `handler` under `M::METHOD_NAME`.
    ///
    /// A method whose name is not an exported identifier, or that repeats a
    /// name already added, is left out without failing registration.
    pub fn add<M, F, Fut>(&mut self, handler: F) -> &mut Self
    where
        M: RpcMethod + Send + Sync + 'static,
        M::Input: Send + 'static,
        M::Output: Send + 'static,
        F: Fn(Arc<S>, RpcContext, M::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M::Output, BoxError>> + Send + 'static,
    {
        let name = M::METHOD_NAME;

        if !is_exported_identifier(name) {
            tracing::debug!("Skipping method {:?}: name is not exported", name);
            self.excluded.push(name.to_string());
            return self;
        }

        let entry = match self.methods.entry(name) {
            Entry::Occupied(_) => {
                tracing::warn!("Skipping method {:?}: already added", name);
                self.excluded.push(name.to_string());
                return self;
            }
            Entry::Vacant(entry) => entry,
        };

        let receiver = self.receiver.clone();
        let handler = Arc::new(handler);
        let invoke: MethodHandler = Arc::new(move |ctx: RpcContext, payload: Vec<u8>| {
            let receiver = receiver.clone();
            let handler = handler.clone();
            async move {
                let input = M::decode_request(&payload).map_err(InvokeError::DecodeArgument)?;
                let output = handler(receiver, ctx, input)
                    .await
                    .map_err(InvokeError::Handler)?;
                M::encode_response(output).map_err(InvokeError::EncodeReply)
            }
            .boxed()
        });

        entry.insert(MethodDescriptor {
            name,
            codec: M::CODEC,
            arg_type: type_name::<M::Input>(),
            reply_type: type_name::<M::Output>(),
            handler: invoke,
        });

        self
    }
}

/// Services addressable by `"Type.Method"`.
///
/// Read-mostly: registrations take the write lock and are serialized
/// against each other and against lookups, while lookups share the read
/// lock. Registration is append-only.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<String, Arc<Service>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the methods of `receiver` under its type name.
    ///
    /// The name is the last path segment of the type, without generic
    /// arguments: `my_app::services::Echo` registers as `"Echo"`.
    pub fn register<S: RpcService>(&self, receiver: Arc<S>) -> Result<(), RegistrationError> {
        self.register_service(short_type_name::<S>(), receiver)
    }

    /// Like `register`, but uses `name` instead of the receiver's type name.
    pub fn register_name<S: RpcService>(
        &self,
        name: &str,
        receiver: Arc<S>,
    ) -> Result<(), RegistrationError> {
        self.register_service(name.to_string(), receiver)
    }

    fn register_service<S: RpcService>(
        &self,
        name: String,
        receiver: Arc<S>,
    ) -> Result<(), RegistrationError> {
        if name.is_empty() {
            return Err(RegistrationError::EmptyServiceName {
                type_name: type_name::<S>(),
            });
        }
        if !is_exported_identifier(&name) {
            return Err(RegistrationError::ServiceNameNotExported(name));
        }

        let mut method_set = MethodSet::new(receiver.clone());
        S::register_methods(&mut method_set);

        if method_set.methods.is_empty() {
            return Err(RegistrationError::NoSuitableMethods {
                service: name,
                excluded: method_set.excluded,
            });
        }

        let mut services = self
            .services
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match services.entry(name) {
            Entry::Occupied(entry) => Err(RegistrationError::DuplicateService(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::info!(
                    "Registered service {} with {} method(s)",
                    entry.key(),
                    method_set.methods.len()
                );
                let service = Service {
                    name: entry.key().clone(),
                    receiver,
                    methods: method_set.methods,
                };
                entry.insert(Arc::new(service));
                Ok(())
            }
        }
    }

    /// Resolves `"Type.Method"` to the receiver and method descriptor.
    pub fn lookup(
        &self,
        service_method: &str,
    ) -> Result<(Arc<dyn Any + Send + Sync>, MethodDescriptor), DispatchError> {
        let (service_name, method_name) = split_service_method(service_method)
            .ok_or_else(|| DispatchError::MalformedServiceMethod(service_method.to_string()))?;

        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);

        let service = services
            .get(service_name)
            .ok_or_else(|| DispatchError::ServiceNotFound(service_name.to_string()))?;

        let method = service
            .method(method_name)
            .ok_or_else(|| DispatchError::MethodNotFound {
                service: service_name.to_string(),
                method: method_name.to_string(),
            })?;

        Ok((service.receiver(), method.clone()))
    }

    pub fn service(&self, name: &str) -> Option<Arc<Service>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered service names, sorted.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }
}

fn short_type_name<S>() -> String {
    let full = type_name::<S>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}
