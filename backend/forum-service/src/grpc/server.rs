// gRPC service implementation for forum service
use crate::error::ServiceError;
use crate::metrics::RequestGuard;
use crate::models::{from_db_id, to_db_id, Listing, Message, Thread};
use crate::services::ContentService;
use std::future::Future;
use tonic::{Request, Response, Status};

// Import generated proto code
pub mod forum {
    pub mod v1 {
        tonic::include_proto!("forum.v1");
    }
    pub use v1::*;
}

use forum::forum_server::{Forum, ForumServer};
use forum::{
    Content, Contents, CreateMessageRequest, CreateThreadRequest, IdRequest, SearchRequest,
};

/// Forum gRPC implementation
#[derive(Clone)]
pub struct ForumServiceImpl {
    content: ContentService,
}

impl ForumServiceImpl {
    pub fn new(content: ContentService) -> Self {
        Self { content }
    }
}

fn convert_thread_to_proto(thread: Thread) -> Content {
    Content {
        id: from_db_id(thread.id),
        created_at: thread.created_at.timestamp(),
        user_id: from_db_id(thread.user_id),
        text: thread.title,
    }
}

fn convert_message_to_proto(message: Message) -> Content {
    Content {
        id: from_db_id(message.id),
        created_at: message.created_at.timestamp(),
        user_id: from_db_id(message.user_id),
        text: message.text,
    }
}

fn convert_listing<T>(listing: Listing<T>, convert: fn(T) -> Content) -> Contents {
    Contents {
        list: listing.items.into_iter().map(convert).collect(),
        total: listing.total,
    }
}

fn created(id: i64) -> forum::Response {
    forum::Response {
        success: true,
        id: from_db_id(id),
    }
}

fn done() -> forum::Response {
    forum::Response {
        success: true,
        id: 0,
    }
}

/// Run one RPC body under a metrics guard and map service errors to Status.
async fn observe<T, F>(method: &'static str, call: F) -> Result<Response<T>, Status>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    let guard = RequestGuard::new(method);
    let result = call.await.map(Response::new).map_err(Status::from);
    guard.complete_with(&result);
    result
}

#[tonic::async_trait]
impl Forum for ForumServiceImpl {
    /// Create a thread, with its first message when `text` is not empty
    async fn create_thread(
        &self,
        request: Request<CreateThreadRequest>,
    ) -> Result<Response<forum::Response>, Status> {
        let req = request.into_inner();
        tracing::info!(
            "gRPC: Creating thread in container {} for user {}",
            req.container_id,
            req.user_id
        );

        observe("CreateThread", async {
            let id = self
                .content
                .create_thread(
                    to_db_id(req.container_id),
                    to_db_id(req.user_id),
                    req.title,
                    req.text,
                )
                .await?;
            Ok(created(id))
        })
        .await
    }

    async fn create_message(
        &self,
        request: Request<CreateMessageRequest>,
    ) -> Result<Response<forum::Response>, Status> {
        let req = request.into_inner();
        tracing::info!(
            "gRPC: Creating message in thread {} for user {}",
            req.thread_id,
            req.user_id
        );

        observe("CreateMessage", async {
            let id = self
                .content
                .create_message(to_db_id(req.thread_id), to_db_id(req.user_id), req.text)
                .await?;
            Ok(created(id))
        })
        .await
    }

    async fn get_thread(&self, request: Request<IdRequest>) -> Result<Response<Content>, Status> {
        let req = request.into_inner();
        tracing::debug!("gRPC: Getting thread {}", req.id);

        observe("GetThread", async {
            let thread = self.content.get_thread(to_db_id(req.id)).await?;
            Ok(convert_thread_to_proto(thread))
        })
        .await
    }

    /// List a container's threads, newest first
    async fn get_threads(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<Contents>, Status> {
        let req = request.into_inner();
        tracing::debug!(
            "gRPC: Getting threads of container {} (filter: {:?}, start: {}, end: {})",
            req.parent_id,
            req.filter,
            req.start,
            req.end
        );

        observe("GetThreads", async {
            let listing = self
                .content
                .get_threads(to_db_id(req.parent_id), &req.filter, req.start, req.end)
                .await?;
            Ok(convert_listing(listing, convert_thread_to_proto))
        })
        .await
    }

    /// List a thread's messages, oldest first
    async fn get_messages(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<Contents>, Status> {
        let req = request.into_inner();
        tracing::debug!(
            "gRPC: Getting messages of thread {} (filter: {:?}, start: {}, end: {})",
            req.parent_id,
            req.filter,
            req.start,
            req.end
        );

        observe("GetMessages", async {
            let listing = self
                .content
                .get_messages(to_db_id(req.parent_id), &req.filter, req.start, req.end)
                .await?;
            Ok(convert_listing(listing, convert_message_to_proto))
        })
        .await
    }

    async fn delete_thread(
        &self,
        request: Request<IdRequest>,
    ) -> Result<Response<forum::Response>, Status> {
        let req = request.into_inner();
        tracing::info!("gRPC: Deleting thread {}", req.id);

        observe("DeleteThread", async {
            self.content.delete_thread(to_db_id(req.id)).await?;
            Ok(done())
        })
        .await
    }

    async fn delete_message(
        &self,
        request: Request<IdRequest>,
    ) -> Result<Response<forum::Response>, Status> {
        let req = request.into_inner();
        tracing::info!("gRPC: Deleting message {}", req.id);

        observe("DeleteMessage", async {
            self.content.delete_message(to_db_id(req.id)).await?;
            Ok(done())
        })
        .await
    }
}

/// Serve the Forum service and its health endpoint until `shutdown` resolves
pub async fn start_grpc_server<S>(
    addr: std::net::SocketAddr,
    content: ContentService,
    shutdown: S,
) -> Result<(), tonic::transport::Error>
where
    S: Future<Output = ()>,
{
    use tonic::transport::Server;
    use tonic_health::server::health_reporter;

    tracing::info!("Starting gRPC server at {}", addr);

    let (mut health, health_service) = health_reporter();
    health
        .set_serving::<ForumServer<ForumServiceImpl>>()
        .await;

    Server::builder()
        .add_service(health_service)
        .add_service(ForumServer::new(ForumServiceImpl::new(content)))
        .serve_with_shutdown(addr, shutdown)
        .await
}
