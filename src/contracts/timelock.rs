// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! TimelockController contract bindings
//!
//! A network inherits OpenZeppelin's `TimelockController` and
//! `AccessControl`, so every `updateDelay`, `updateName` or other privileged
//! change goes through `schedule` and `execute`. These bindings cover that
//! inherited surface.

use std::future::IntoFuture;

use alloy_network::Ethereum;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use crate::config::WatchConfig;
use crate::error::Result;
use crate::history::{self, RoleMembers, ScheduledOperation};
use crate::timelock::{BatchOperation, Operation, OperationState};
use crate::traits::LogProvider;
use TimelockController::TimelockControllerInstance;

/// The TimelockController contract wrapper
///
/// # Example
///
/// ```rust,no_run
/// use network_bindings::{Operation, TimelockContract};
/// use alloy_primitives::{address, Bytes, U256};
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let network = address!("1234567890123456789012345678901234567890");
/// let proposer = address!("0987654321098765432109876543210987654321");
/// let timelock = TimelockContract::new(network, provider);
///
/// let op = Operation::builder()
///     .target(network)
///     .data(Bytes::new())
///     .build();
/// let delay = timelock.get_min_delay().await?;
/// let tx = timelock.schedule_transaction(proposer, &op, delay);
///
/// let state = timelock.get_operation_state(op.id()).await?;
/// # Ok(())
/// # }
/// ```
pub struct TimelockContract<P: Provider<Ethereum>> {
    instance: TimelockControllerInstance<P>,
}

impl<P: Provider<Ethereum>> TimelockContract<P> {
    /// Create a new TimelockContract
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "timelock_contract_initialized"
        );
        Self {
            instance: TimelockControllerInstance::new(address, provider),
        }
    }

    /// Returns the contract address
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// Global minimum delay for scheduled operations
    pub async fn get_min_delay(&self) -> Result<U256> {
        let delay = self
            .read("getMinDelay", self.instance.getMinDelay().call())
            .await?;

        info!(
            contract_address = %self.address(),
            min_delay = %delay,
            event = "global_min_delay_retrieved"
        );
        Ok(delay)
    }

    /// Timestamp at which operation `id` becomes ready
    ///
    /// Zero for unset operations and one for done operations.
    pub async fn get_timestamp(&self, id: B256) -> Result<U256> {
        self.read("getTimestamp", self.instance.getTimestamp(id).call())
            .await
    }

    pub async fn get_operation_state(&self, id: B256) -> Result<OperationState> {
        let raw = self
            .read(
                "getOperationState",
                self.instance.getOperationState(id).call(),
            )
            .await?;
        let state = OperationState::try_from(raw)?;

        debug!(
            contract_address = %self.address(),
            operation_id = %id,
            state = %state,
            event = "operation_state_retrieved"
        );
        Ok(state)
    }

    /// Whether operation `id` was ever scheduled and not cancelled
    pub async fn is_operation(&self, id: B256) -> Result<bool> {
        self.read("isOperation", self.instance.isOperation(id).call())
            .await
    }

    pub async fn is_operation_pending(&self, id: B256) -> Result<bool> {
        self.read(
            "isOperationPending",
            self.instance.isOperationPending(id).call(),
        )
        .await
    }

    pub async fn is_operation_ready(&self, id: B256) -> Result<bool> {
        self.read("isOperationReady", self.instance.isOperationReady(id).call())
            .await
    }

    pub async fn is_operation_done(&self, id: B256) -> Result<bool> {
        self.read("isOperationDone", self.instance.isOperationDone(id).call())
            .await
    }

    pub async fn has_role(&self, role: B256, account: Address) -> Result<bool> {
        let has = self
            .read("hasRole", self.instance.hasRole(role, account).call())
            .await?;

        debug!(
            contract_address = %self.address(),
            role = %role,
            account = %account,
            has_role = has,
            event = "role_checked"
        );
        Ok(has)
    }

    /// Role that administers `role`
    pub async fn get_role_admin(&self, role: B256) -> Result<B256> {
        self.read("getRoleAdmin", self.instance.getRoleAdmin(role).call())
            .await
    }

    /// Operation id as computed by the contract
    ///
    /// Matches [`Operation::id`], which computes the same hash locally.
    pub async fn hash_operation(&self, op: &Operation) -> Result<B256> {
        self.read(
            "hashOperation",
            self.instance
                .hashOperation(op.target, op.value, op.data.clone(), op.predecessor, op.salt)
                .call(),
        )
        .await
    }

    /// Batch operation id as computed by the contract
    ///
    /// Matches [`BatchOperation::id`]. Omitted values are sent as zero, the
    /// way [`schedule_batch_transaction`](Self::schedule_batch_transaction)
    /// sends them.
    pub async fn hash_operation_batch(&self, op: &BatchOperation) -> Result<B256> {
        self.read(
            "hashOperationBatch",
            self.instance
                .hashOperationBatch(
                    op.targets.clone(),
                    op.resolved_values(),
                    op.payloads.clone(),
                    op.predecessor,
                    op.salt,
                )
                .call(),
        )
        .await
    }

    /// Every operation scheduled since `from_block`, with its current state
    ///
    /// Operations are rebuilt from `CallScheduled` and `CallSalt` events,
    /// then their timestamp and state are read from the contract. Ready
    /// operations come first, then waiting and done ones, each by timestamp.
    pub async fn load_operations<L: LogProvider>(
        &self,
        logs: &L,
        from_block: u64,
        config: &WatchConfig,
    ) -> Result<Vec<ScheduledOperation>> {
        let address = self.address();
        let mut operations =
            history::query_scheduled_operations(logs, address, from_block, config).await?;
        for op in &mut operations {
            op.timestamp = self.get_timestamp(op.id).await?;
            op.state = self.get_operation_state(op.id).await?;
        }
        history::sort_operations(&mut operations);

        info!(
            contract_address = %address,
            operations = operations.len(),
            event = "operations_loaded"
        );
        Ok(operations)
    }

    /// Current members of every role, with the role's admin
    ///
    /// Members are rebuilt by replaying `RoleGranted` and `RoleRevoked`
    /// events from `from_block` in chain order. The network's known roles are
    /// listed even when nobody holds them.
    pub async fn load_role_members<L: LogProvider>(
        &self,
        logs: &L,
        from_block: u64,
        config: &WatchConfig,
    ) -> Result<Vec<RoleMembers>> {
        let address = self.address();
        let mut roles = history::query_role_members(logs, address, from_block, config).await?;
        for entry in &mut roles {
            entry.admin = Some(self.get_role_admin(entry.role).await?);
        }

        info!(
            contract_address = %address,
            roles = roles.len(),
            event = "role_members_loaded"
        );
        Ok(roles)
    }

    /// Create transaction request for `schedule`
    ///
    /// The sender needs `PROPOSER_ROLE` and `delay` must be at least the
    /// minimum delay that applies to the call.
    pub fn schedule_transaction(
        &self,
        from_address: Address,
        op: &Operation,
        delay: U256,
    ) -> TransactionRequest {
        info!(
            from_address = %from_address,
            operation_id = %op.id(),
            target = %op.target,
            delay = %delay,
            contract_address = %self.address(),
            event = "schedule_transaction_created"
        );

        self.instance
            .schedule(
                op.target,
                op.value,
                op.data.clone(),
                op.predecessor,
                op.salt,
                delay,
            )
            .from(from_address)
            .into_transaction_request()
    }

    /// Create transaction request for `scheduleBatch`
    pub fn schedule_batch_transaction(
        &self,
        from_address: Address,
        op: &BatchOperation,
        delay: U256,
    ) -> Result<TransactionRequest> {
        let id = op.id()?;
        info!(
            from_address = %from_address,
            operation_id = %id,
            calls = op.targets.len(),
            delay = %delay,
            contract_address = %self.address(),
            event = "schedule_batch_transaction_created"
        );

        Ok(self
            .instance
            .scheduleBatch(
                op.targets.clone(),
                op.resolved_values(),
                op.payloads.clone(),
                op.predecessor,
                op.salt,
                delay,
            )
            .from(from_address)
            .into_transaction_request())
    }

    /// Create transaction request for `execute`
    ///
    /// The operation's value is attached to the transaction.
    pub fn execute_transaction(&self, from_address: Address, op: &Operation) -> TransactionRequest {
        info!(
            from_address = %from_address,
            operation_id = %op.id(),
            target = %op.target,
            value = %op.value,
            contract_address = %self.address(),
            event = "execute_transaction_created"
        );

        self.instance
            .execute(op.target, op.value, op.data.clone(), op.predecessor, op.salt)
            .value(op.value)
            .from(from_address)
            .into_transaction_request()
    }

    /// Create transaction request for `executeBatch`
    pub fn execute_batch_transaction(
        &self,
        from_address: Address,
        op: &BatchOperation,
    ) -> Result<TransactionRequest> {
        let id = op.id()?;
        let values = op.resolved_values();
        let total = values.iter().copied().fold(U256::ZERO, U256::saturating_add);
        info!(
            from_address = %from_address,
            operation_id = %id,
            calls = op.targets.len(),
            value = %total,
            contract_address = %self.address(),
            event = "execute_batch_transaction_created"
        );

        Ok(self
            .instance
            .executeBatch(
                op.targets.clone(),
                values,
                op.payloads.clone(),
                op.predecessor,
                op.salt,
            )
            .value(total)
            .from(from_address)
            .into_transaction_request())
    }

    /// Create transaction request for `cancel`
    pub fn cancel_transaction(&self, from_address: Address, id: B256) -> TransactionRequest {
        info!(
            from_address = %from_address,
            operation_id = %id,
            contract_address = %self.address(),
            event = "cancel_transaction_created"
        );

        self.instance
            .cancel(id)
            .from(from_address)
            .into_transaction_request()
    }

    async fn read<T, C>(&self, method: &'static str, call: C) -> Result<T>
    where
        C: IntoFuture<Output = std::result::Result<T, alloy_contract::Error>>,
    {
        super::traced_call("TimelockController", self.address(), method, call).await
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    contract TimelockController {
        event CallScheduled(bytes32 indexed id, uint256 indexed index, address target, uint256 value, bytes data, bytes32 predecessor, uint256 delay);
        event CallExecuted(bytes32 indexed id, uint256 indexed index, address target, uint256 value, bytes data);
        event CallSalt(bytes32 indexed id, bytes32 salt);
        event Cancelled(bytes32 indexed id);
        event MinDelayChange(uint256 oldDuration, uint256 newDuration);
        event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);
        event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
        event RoleAdminChanged(bytes32 indexed role, bytes32 indexed previousAdminRole, bytes32 indexed newAdminRole);

        error TimelockInvalidOperationLength(uint256 targets, uint256 payloads, uint256 values);
        error TimelockInsufficientDelay(uint256 delay, uint256 minDelay);
        error TimelockUnexpectedOperationState(bytes32 operationId, bytes32 expectedStates);
        error TimelockUnexecutedPredecessor(bytes32 predecessorId);
        error TimelockUnauthorizedCaller(address caller);
        error AccessControlUnauthorizedAccount(address account, bytes32 neededRole);

        function getMinDelay() external view returns (uint256);
        function getTimestamp(bytes32 id) external view returns (uint256);
        // OperationState is a uint8 enum on the wire
        function getOperationState(bytes32 id) external view returns (uint8);
        function isOperation(bytes32 id) external view returns (bool);
        function isOperationPending(bytes32 id) external view returns (bool);
        function isOperationReady(bytes32 id) external view returns (bool);
        function isOperationDone(bytes32 id) external view returns (bool);
        function hashOperation(address target, uint256 value, bytes calldata data, bytes32 predecessor, bytes32 salt) external pure returns (bytes32);
        function hashOperationBatch(address[] calldata targets, uint256[] calldata values, bytes[] calldata payloads, bytes32 predecessor, bytes32 salt) external pure returns (bytes32);
        function schedule(address target, uint256 value, bytes calldata data, bytes32 predecessor, bytes32 salt, uint256 delay) external;
        function scheduleBatch(address[] calldata targets, uint256[] calldata values, bytes[] calldata payloads, bytes32 predecessor, bytes32 salt, uint256 delay) external;
        function cancel(bytes32 id) external;
        function execute(address target, uint256 value, bytes calldata payload, bytes32 predecessor, bytes32 salt) external payable;
        function executeBatch(address[] calldata targets, uint256[] calldata values, bytes[] calldata payloads, bytes32 predecessor, bytes32 salt) external payable;

        function hasRole(bytes32 role, address account) external view returns (bool);
        function getRoleAdmin(bytes32 role) external view returns (bytes32);
        function PROPOSER_ROLE() external view returns (bytes32);
        function EXECUTOR_ROLE() external view returns (bytes32);
        function CANCELLER_ROLE() external view returns (bytes32);
        function DEFAULT_ADMIN_ROLE() external view returns (bytes32);
    }
}
