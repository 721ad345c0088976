// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single-shot value reads.

use std::sync::Arc;
use std::time::Duration;

use crate::client::{DataValue, ReadRequest, Session, UaTransport};
use crate::error::{OpcUaResult, ReadError};
use crate::types::NodeId;

/// Submits read requests on an active session.
///
/// No retry policy is built in; a faulted read is returned to the caller.
pub struct ReadExecutor<T: UaTransport + ?Sized> {
    transport: Arc<T>,
    timeout: Duration,
}

impl<T: UaTransport + ?Sized> ReadExecutor<T> {
    /// Creates an executor.
    pub fn new(transport: Arc<T>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Reads the value attribute of every node, in request order.
    pub async fn read(&self, session: &Session, nodes: &[NodeId]) -> OpcUaResult<Vec<DataValue>> {
        self.execute(session, &ReadRequest::for_values(nodes.iter().cloned()))
            .await
    }

    /// Reads the value attribute of one node.
    pub async fn read_one(&self, session: &Session, node: &NodeId) -> OpcUaResult<DataValue> {
        let mut values = self.read(session, std::slice::from_ref(node)).await?;
        // Count already checked by `execute`.
        values
            .pop()
            .ok_or_else(|| ReadError::result_count_mismatch(1, 0).into())
    }

    /// Submits a prepared request.
    pub async fn execute(&self, session: &Session, request: &ReadRequest) -> OpcUaResult<Vec<DataValue>> {
        session.ensure_active()?;

        let nodes = request.describe();
        tracing::debug!(channel = %session.channel(), nodes = %nodes, max_age = request.max_age, "Reading");

        let values = match tokio::time::timeout(
            self.timeout,
            self.transport.read(session.channel(), request),
        )
        .await
        {
            Ok(Ok(values)) => values,
            Ok(Err(fault)) => return Err(ReadError::faulted(nodes, fault).into()),
            Err(_) => return Err(ReadError::timed_out(nodes, self.timeout).into()),
        };

        if values.len() != request.nodes_to_read.len() {
            return Err(ReadError::result_count_mismatch(request.nodes_to_read.len(), values.len()).into());
        }

        for (id, value) in request.nodes_to_read.iter().zip(&values) {
            if value.status.is_bad() {
                tracing::debug!(node_id = %id.node_id, status = %value.status, "Read returned bad status");
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::SecurityMaterial;
    use crate::client::{
        BrowseDescription, ChannelId, ClientIdentity, Endpoint, ReferenceDescription, SessionManager,
        Variant,
    };
    use crate::config::TimeoutSettings;
    use crate::error::{OpcUaError, ServiceFault};
    use crate::types::{SecurityMode, SecurityPolicy, StatusCode, TimestampsToReturn};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;

    struct ReadTransport {
        reply: Result<Vec<DataValue>, ServiceFault>,
        seen: Mutex<Option<ReadRequest>>,
    }

    #[async_trait]
    impl UaTransport for ReadTransport {
        async fn discover_endpoints(
            &self,
            _url: &str,
            _identity: &ClientIdentity,
        ) -> Result<Vec<Endpoint>, ServiceFault> {
            Ok(vec![])
        }

        async fn create_channel(
            &self,
            _endpoint: &Endpoint,
            _material: &SecurityMaterial,
            _identity: &ClientIdentity,
        ) -> Result<ChannelId, ServiceFault> {
            Ok(ChannelId(1))
        }

        async fn activate_session(&self, _channel: ChannelId) -> Result<(), ServiceFault> {
            Ok(())
        }

        async fn read(
            &self,
            _channel: ChannelId,
            request: &ReadRequest,
        ) -> Result<Vec<DataValue>, ServiceFault> {
            *self.seen.lock() = Some(request.clone());
            self.reply.clone()
        }

        async fn browse(
            &self,
            _channel: ChannelId,
            _description: &BrowseDescription,
        ) -> Result<Vec<ReferenceDescription>, ServiceFault> {
            Ok(vec![])
        }

        async fn close_channel(&self, _channel: ChannelId) -> Result<(), ServiceFault> {
            Ok(())
        }

        fn display_name(&self) -> String {
            "read".into()
        }
    }

    async fn setup(
        reply: Result<Vec<DataValue>, ServiceFault>,
    ) -> (Arc<ReadTransport>, ReadExecutor<ReadTransport>, Session) {
        let transport = Arc::new(ReadTransport {
            reply,
            seen: Mutex::new(None),
        });
        let sessions = SessionManager::new(
            transport.clone(),
            ClientIdentity::for_application("test"),
            TimeoutSettings::default(),
        );
        let endpoint = Endpoint::new("opc.tcp://host:4840", SecurityPolicy::None, SecurityMode::None);
        let session = sessions
            .open(&endpoint, &SecurityMaterial::NoCertificateNeeded { https: None })
            .await
            .unwrap();
        let executor = ReadExecutor::new(transport.clone(), Duration::from_secs(1));
        (transport, executor, session)
    }

    #[tokio::test]
    async fn test_read_one() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let (transport, executor, session) = setup(Ok(vec![DataValue::new(42.5, ts)])).await;

        let node: NodeId = "ns=2;s=Temperature".parse().unwrap();
        let value = executor.read_one(&session, &node).await.unwrap();
        assert_eq!(value.value, Variant::Double(42.5));
        assert_eq!(value.server_timestamp, Some(ts));

        let request = transport.seen.lock().clone().unwrap();
        assert_eq!(request.max_age, 500.0);
        assert_eq!(request.timestamps_to_return, TimestampsToReturn::Both);
        assert_eq!(request.nodes_to_read.len(), 1);
        assert_eq!(request.nodes_to_read[0].node_id, node);
    }

    #[tokio::test]
    async fn test_read_keeps_request_order() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let (_, executor, session) = setup(Ok(vec![DataValue::new(1i32, ts), DataValue::new(2i32, ts)])).await;

        let values = executor
            .read(&session, &[NodeId::numeric(2, 1), NodeId::numeric(2, 2)])
            .await
            .unwrap();
        assert_eq!(values[0].value, Variant::Int32(1));
        assert_eq!(values[1].value, Variant::Int32(2));
    }

    #[tokio::test]
    async fn test_read_fault() {
        let fault = ServiceFault::new(StatusCode::BAD_NODE_ID_UNKNOWN, "unknown node");
        let (_, executor, session) = setup(Err(fault)).await;

        let err = executor
            .read_one(&session, &NodeId::string(2, "Missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, OpcUaError::Read(ReadError::Faulted { .. })));
        assert!(err.to_string().contains("ns=2;s=Missing"));
    }

    #[tokio::test]
    async fn test_result_count_mismatch() {
        let (_, executor, session) = setup(Ok(vec![])).await;

        let err = executor
            .read_one(&session, &NodeId::numeric(0, 2258))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OpcUaError::Read(ReadError::ResultCountMismatch { expected: 1, actual: 0 })
        ));
    }
}
