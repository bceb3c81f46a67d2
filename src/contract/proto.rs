//! Messages and client for `io.opensergo.proto.service_contract.v1`.
//!
//! Kept in the shape `tonic-build` emits so no protoc is needed at build
//! time. Only the fields this service fills are declared.

/// Report the metadata of one application
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReportMetadataRequest {
    #[prost(string, tag = "1")]
    pub app_name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub service_metadata: ::prost::alloc::vec::Vec<ServiceMetadata>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ReportMetadataReply {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceMetadata {
    #[prost(message, repeated, tag = "1")]
    pub listening_addresses: ::prost::alloc::vec::Vec<SocketAddress>,
    #[prost(string, repeated, tag = "2")]
    pub protocols: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "3")]
    pub service_contract: ::core::option::Option<ServiceContract>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SocketAddress {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub port_value: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceContract {
    #[prost(message, repeated, tag = "1")]
    pub services: ::prost::alloc::vec::Vec<ServiceDescriptor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceDescriptor {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub methods: ::prost::alloc::vec::Vec<MethodDescriptor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MethodDescriptor {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "7")]
    pub http_paths: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "8")]
    pub http_methods: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

pub mod metadata_service_client {
    use tonic::codegen::http;
    use tonic::transport::Channel;

    const REPORT_METADATA_PATH: &str =
        "/io.opensergo.proto.service_contract.v1.MetadataService/ReportMetadata";

    #[derive(Debug, Clone)]
    pub struct MetadataServiceClient {
        inner: tonic::client::Grpc<Channel>,
    }

    impl MetadataServiceClient {
        pub fn new(channel: Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        pub async fn report_metadata(
            &mut self,
            request: impl tonic::IntoRequest<super::ReportMetadataRequest>,
        ) -> std::result::Result<tonic::Response<super::ReportMetadataReply>, tonic::Status>
        {
            self.inner
                .ready()
                .await
                .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {}", e)))?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(REPORT_METADATA_PATH);
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}
