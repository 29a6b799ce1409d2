// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Views rebuilt from a network's event history
//!
//! The timelock keeps no enumerable list of operations, role members or
//! configured delays. Each view here replays the relevant events and folds
//! them into the current picture:
//!
//! - scheduled operations, from `CallScheduled` and `CallSalt`
//! - role members, from `RoleGranted` and `RoleRevoked`
//! - current delays, from `MinDelayChange`
//!
//! The `query_*` functions fetch the events through a [`LogProvider`] and
//! fold them. Fields that only the contract knows (operation state and
//! timestamp, role admins) are filled in by
//! [`TimelockContract`](crate::TimelockContract).

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WatchConfig;
use crate::contracts::timelock::TimelockController::{
    CallSalt, CallScheduled, RoleGranted, RoleRevoked,
};
use crate::error::Result;
use crate::events::{self, EventLog, MinDelayChangeFilter, MinDelayChangeLog, SignatureFilter};
use crate::timelock::{BatchOperation, Operation, OperationState, Role};
use crate::traits::LogProvider;

/// Delay currently configured for one target and selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayEntry {
    pub target: Address,
    pub selector: FixedBytes<4>,
    pub enabled: bool,
    pub delay: U256,
    /// Block of the change that set this delay
    pub block_number: Option<u64>,
}

/// One call of a scheduled operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCall {
    pub index: U256,
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
}

/// An operation rebuilt from its `CallScheduled` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    pub id: B256,
    pub predecessor: B256,
    /// Zero when no `CallSalt` was emitted
    pub salt: B256,
    pub delay: U256,
    /// Calls ordered by index
    pub calls: Vec<ScheduledCall>,
    /// Ready timestamp, zero until read from the contract
    pub timestamp: U256,
    /// `Unset` until read from the contract
    pub state: OperationState,
}

impl ScheduledOperation {
    /// The operation as a batch, suitable for `executeBatch` or `cancel`
    pub fn batch(&self) -> BatchOperation {
        BatchOperation {
            targets: self.calls.iter().map(|call| call.target).collect(),
            values: self.calls.iter().map(|call| call.value).collect(),
            payloads: self.calls.iter().map(|call| call.data.clone()).collect(),
            predecessor: self.predecessor,
            salt: self.salt,
        }
    }

    /// The operation as a single call, when it has exactly one
    pub fn single(&self) -> Option<Operation> {
        match self.calls.as_slice() {
            [call] => Some(Operation {
                target: call.target,
                value: call.value,
                data: call.data.clone(),
                predecessor: self.predecessor,
                salt: self.salt,
            }),
            _ => None,
        }
    }
}

/// Current holders of one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMembers {
    pub role: B256,
    /// Set for the roles a network is known to use
    pub name: Option<Role>,
    /// Administering role, `None` until read from the contract
    pub admin: Option<B256>,
    /// Members in address order
    pub members: Vec<Address>,
}

/// Keeps the last change per target and selector.
///
/// `changes` must be in chain order, as queries return them. Entries come
/// back enabled first, then by target, then by selector.
pub fn latest_delays(changes: &[MinDelayChangeLog]) -> Vec<DelayEntry> {
    let mut latest = HashMap::new();
    for change in changes {
        let event = &change.event;
        latest.insert(
            (event.target, event.selector),
            DelayEntry {
                target: event.target,
                selector: event.selector,
                enabled: event.newEnabledStatus,
                delay: event.newDelay,
                block_number: change.block_number(),
            },
        );
    }

    let mut entries: Vec<_> = latest.into_values().collect();
    entries.sort_by(|a, b| {
        b.enabled
            .cmp(&a.enabled)
            .then_with(|| a.target.cmp(&b.target))
            .then_with(|| a.selector.cmp(&b.selector))
    });
    entries
}

/// Groups `CallScheduled` events into operations.
///
/// Operations keep the order their first call was seen in. Salts are taken
/// from the matching `CallSalt` event.
pub fn group_operations(
    scheduled: &[EventLog<CallScheduled>],
    salts: &[EventLog<CallSalt>],
) -> Vec<ScheduledOperation> {
    let salt_by_id: HashMap<B256, B256> = salts
        .iter()
        .map(|log| (log.event.id, log.event.salt))
        .collect();

    let mut operations: Vec<ScheduledOperation> = Vec::new();
    let mut position: HashMap<B256, usize> = HashMap::new();
    for log in scheduled {
        let event = &log.event;
        let call = ScheduledCall {
            index: event.index,
            target: event.target,
            value: event.value,
            data: event.data.clone(),
        };
        match position.get(&event.id) {
            Some(&at) => operations[at].calls.push(call),
            None => {
                position.insert(event.id, operations.len());
                operations.push(ScheduledOperation {
                    id: event.id,
                    predecessor: event.predecessor,
                    salt: salt_by_id.get(&event.id).copied().unwrap_or_default(),
                    delay: event.delay,
                    calls: vec![call],
                    timestamp: U256::ZERO,
                    state: OperationState::Unset,
                });
            }
        }
    }

    for op in &mut operations {
        op.calls.sort_by_key(|call| call.index);
    }
    operations
}

fn state_rank(state: OperationState) -> u8 {
    match state {
        OperationState::Ready => 0,
        OperationState::Waiting => 1,
        OperationState::Done => 2,
        OperationState::Unset => 3,
    }
}

/// Orders operations ready first, then waiting, then done, then unset.
///
/// Within a state, earlier timestamps come first. The sort is stable.
pub fn sort_operations(operations: &mut [ScheduledOperation]) {
    operations.sort_by(|a, b| {
        state_rank(a.state)
            .cmp(&state_rank(b.state))
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });
}

fn chain_position<E>(log: &EventLog<E>) -> (Option<u64>, Option<u64>) {
    (log.block_number(), log.log_index())
}

/// Replays grants and revocations into current role members.
///
/// Both lists are merged in chain order, so an account granted again after
/// a revocation is a member. Every [`Role`] is listed even without members.
/// Named roles come first, then the rest, each by role id.
pub fn replay_role_members(
    grants: &[EventLog<RoleGranted>],
    revokes: &[EventLog<RoleRevoked>],
) -> Vec<RoleMembers> {
    enum Change {
        Grant(B256, Address),
        Revoke(B256, Address),
    }

    let mut changes: Vec<_> = grants
        .iter()
        .map(|log| {
            (
                chain_position(log),
                Change::Grant(log.event.role, log.event.account),
            )
        })
        .chain(revokes.iter().map(|log| {
            (
                chain_position(log),
                Change::Revoke(log.event.role, log.event.account),
            )
        }))
        .collect();
    changes.sort_by_key(|(position, _)| *position);

    let mut members: BTreeMap<B256, BTreeSet<Address>> = Role::ALL
        .iter()
        .map(|role| (role.id(), BTreeSet::new()))
        .collect();
    for (_, change) in changes {
        match change {
            Change::Grant(role, account) => {
                members.entry(role).or_default().insert(account);
            }
            Change::Revoke(role, account) => {
                members.entry(role).or_default().remove(&account);
            }
        }
    }

    let mut roles: Vec<_> = members
        .into_iter()
        .map(|(role, accounts)| RoleMembers {
            role,
            name: Role::from_id(role),
            admin: None,
            members: accounts.into_iter().collect(),
        })
        .collect();
    roles.sort_by(|a, b| match (a.name.is_some(), b.name.is_some()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.role.cmp(&b.role),
    });
    roles
}

/// Current delays of the network at `address`, from `from_block` on.
pub async fn query_current_delays<L: LogProvider + ?Sized>(
    logs: &L,
    address: Address,
    from_block: u64,
    config: &WatchConfig,
) -> Result<Vec<DelayEntry>> {
    let filter = MinDelayChangeFilter::builder().from_block(from_block).build();
    let changes = events::query_events(logs, address, &filter, config).await?;
    let delays = latest_delays(&changes);

    debug!(
        contract_address = %address,
        changes = changes.len(),
        delays = delays.len(),
        event = "delay_history_replayed"
    );
    Ok(delays)
}

/// Operations scheduled on the timelock at `address` since `from_block`.
///
/// State and timestamp are left unset.
pub async fn query_scheduled_operations<L: LogProvider + ?Sized>(
    logs: &L,
    address: Address,
    from_block: u64,
    config: &WatchConfig,
) -> Result<Vec<ScheduledOperation>> {
    let scheduled = events::query_events(
        logs,
        address,
        &SignatureFilter::<CallScheduled>::new().from_block(from_block),
        config,
    )
    .await?;
    let salts = events::query_events(
        logs,
        address,
        &SignatureFilter::<CallSalt>::new().from_block(from_block),
        config,
    )
    .await?;
    let operations = group_operations(&scheduled, &salts);

    debug!(
        contract_address = %address,
        scheduled_calls = scheduled.len(),
        salts = salts.len(),
        operations = operations.len(),
        event = "operation_history_replayed"
    );
    Ok(operations)
}

/// Role members of the timelock at `address`, replayed from `from_block`.
///
/// Admins are left unset.
pub async fn query_role_members<L: LogProvider + ?Sized>(
    logs: &L,
    address: Address,
    from_block: u64,
    config: &WatchConfig,
) -> Result<Vec<RoleMembers>> {
    let grants = events::query_events(
        logs,
        address,
        &SignatureFilter::<RoleGranted>::new().from_block(from_block),
        config,
    )
    .await?;
    let revokes = events::query_events(
        logs,
        address,
        &SignatureFilter::<RoleRevoked>::new().from_block(from_block),
        config,
    )
    .await?;
    let roles = replay_role_members(&grants, &revokes);

    debug!(
        contract_address = %address,
        grants = grants.len(),
        revokes = revokes.len(),
        roles = roles.len(),
        event = "role_history_replayed"
    );
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::network::INetwork::MinDelayChange;
    use crate::testing::FakeLogProvider;
    use crate::timelock::{EXECUTOR_ROLE, PROPOSER_ROLE};
    use alloy_primitives::{address, bytes, fixed_bytes};
    use alloy_rpc_types::Log;
    use alloy_sol_types::SolEvent;

    const NETWORK: Address = address!("00000000000000000000000000000000000000aa");
    const TARGET_A: Address = address!("1111111111111111111111111111111111111111");
    const TARGET_B: Address = address!("2222222222222222222222222222222222222222");
    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
    const BOB: Address = address!("0000000000000000000000000000000000000b0b");

    fn rpc_log<E: SolEvent>(event: &E, block: u64, log_index: u64) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: NETWORK,
                data: event.encode_log_data(),
            },
            block_number: Some(block),
            log_index: Some(log_index),
            ..Default::default()
        }
    }

    fn event_log<E: SolEvent + Clone>(event: E, block: u64, log_index: u64) -> EventLog<E> {
        let log = rpc_log(&event, block, log_index);
        EventLog { event, log }
    }

    fn delay_change(
        target: Address,
        selector: FixedBytes<4>,
        enabled: bool,
        delay: u64,
    ) -> MinDelayChange {
        MinDelayChange {
            target,
            selector,
            oldEnabledStatus: false,
            oldDelay: U256::ZERO,
            newEnabledStatus: enabled,
            newDelay: U256::from(delay),
        }
    }

    fn scheduled(id: B256, index: u64, target: Address) -> CallScheduled {
        CallScheduled {
            id,
            index: U256::from(index),
            target,
            value: U256::from(index),
            data: bytes!("84da92a7"),
            predecessor: B256::ZERO,
            delay: U256::from(3_600),
        }
    }

    fn granted(role: B256, account: Address) -> RoleGranted {
        RoleGranted {
            role,
            account,
            sender: NETWORK,
        }
    }

    fn revoked(role: B256, account: Address) -> RoleRevoked {
        RoleRevoked {
            role,
            account,
            sender: NETWORK,
        }
    }

    fn operation(id: u8, state: OperationState, timestamp: u64) -> ScheduledOperation {
        ScheduledOperation {
            id: B256::repeat_byte(id),
            predecessor: B256::ZERO,
            salt: B256::ZERO,
            delay: U256::ZERO,
            calls: Vec::new(),
            timestamp: U256::from(timestamp),
            state,
        }
    }

    #[test]
    fn test_latest_delay_wins_per_pair() {
        let changes = vec![
            event_log(delay_change(TARGET_A, fixed_bytes!("6773522c"), true, 10), 1, 0),
            event_log(delay_change(TARGET_A, fixed_bytes!("6773522c"), true, 20), 2, 0),
            event_log(delay_change(TARGET_A, fixed_bytes!("84da92a7"), false, 5), 3, 0),
        ];

        let delays = latest_delays(&changes);

        assert_eq!(delays.len(), 2);
        assert_eq!(delays[0].selector, fixed_bytes!("6773522c"));
        assert_eq!(delays[0].delay, U256::from(20));
        assert_eq!(delays[0].block_number, Some(2));
        assert!(!delays[1].enabled);
    }

    #[test]
    fn test_delays_sort_enabled_then_target_then_selector() {
        let changes = vec![
            event_log(delay_change(TARGET_A, fixed_bytes!("00000001"), false, 1), 1, 0),
            event_log(delay_change(TARGET_B, fixed_bytes!("00000001"), true, 1), 1, 1),
            event_log(delay_change(TARGET_A, fixed_bytes!("00000002"), true, 1), 1, 2),
            event_log(delay_change(TARGET_A, fixed_bytes!("00000001"), true, 1), 1, 3),
        ];

        let order: Vec<_> = latest_delays(&changes)
            .into_iter()
            .map(|d| (d.enabled, d.target, d.selector))
            .collect();

        assert_eq!(
            order,
            vec![
                (true, TARGET_A, fixed_bytes!("00000001")),
                (true, TARGET_A, fixed_bytes!("00000002")),
                (true, TARGET_B, fixed_bytes!("00000001")),
            ]
        );
    }

    #[test]
    fn test_group_operations_orders_calls_and_attaches_salt() {
        let batch = B256::repeat_byte(1);
        let single = B256::repeat_byte(2);
        let scheduled = vec![
            event_log(scheduled(batch, 1, TARGET_B), 5, 0),
            event_log(scheduled(single, 0, TARGET_A), 5, 1),
            event_log(scheduled(batch, 0, TARGET_A), 5, 2),
        ];
        let salts = vec![event_log(
            CallSalt {
                id: batch,
                salt: B256::repeat_byte(9),
            },
            5,
            3,
        )];

        let operations = group_operations(&scheduled, &salts);

        assert_eq!(operations.len(), 2);
        assert_eq!(operations[0].id, batch);
        assert_eq!(operations[0].salt, B256::repeat_byte(9));
        assert_eq!(
            operations[0].batch().targets,
            vec![TARGET_A, TARGET_B]
        );
        assert!(operations[0].single().is_none());
        assert_eq!(operations[1].salt, B256::ZERO);
        assert_eq!(operations[1].single().map(|op| op.target), Some(TARGET_A));
    }

    #[test]
    fn test_rebuilt_batch_hashes_to_scheduled_id() {
        let op = BatchOperation::builder()
            .targets(vec![TARGET_A, TARGET_B])
            .values(vec![U256::ZERO, U256::from(1)])
            .payloads(vec![bytes!("84da92a7"), bytes!("84da92a7")])
            .salt(B256::repeat_byte(7))
            .build();
        let id = op.id().unwrap();
        let scheduled = vec![
            event_log(scheduled(id, 0, TARGET_A), 1, 0),
            event_log(scheduled(id, 1, TARGET_B), 1, 1),
        ];
        let salts = vec![event_log(
            CallSalt {
                id,
                salt: B256::repeat_byte(7),
            },
            1,
            2,
        )];

        let rebuilt = &group_operations(&scheduled, &salts)[0];

        assert_eq!(rebuilt.batch().id().unwrap(), id);
    }

    #[test]
    fn test_sort_operations_by_state_then_timestamp() {
        let mut operations = vec![
            operation(1, OperationState::Done, 1),
            operation(2, OperationState::Waiting, 300),
            operation(3, OperationState::Unset, 0),
            operation(4, OperationState::Ready, 50),
            operation(5, OperationState::Waiting, 200),
        ];

        sort_operations(&mut operations);

        let ids: Vec<_> = operations.iter().map(|op| op.id[0]).collect();
        assert_eq!(ids, vec![4, 5, 2, 1, 3]);
    }

    #[test]
    fn test_role_replay_follows_chain_order() {
        let grants = vec![
            event_log(granted(PROPOSER_ROLE, ALICE), 1, 0),
            event_log(granted(PROPOSER_ROLE, BOB), 1, 1),
            event_log(granted(PROPOSER_ROLE, ALICE), 3, 0),
        ];
        let revokes = vec![
            event_log(revoked(PROPOSER_ROLE, ALICE), 2, 0),
            event_log(revoked(PROPOSER_ROLE, BOB), 4, 0),
        ];

        let roles = replay_role_members(&grants, &revokes);
        let proposers = roles
            .iter()
            .find(|entry| entry.role == PROPOSER_ROLE)
            .unwrap();

        assert_eq!(proposers.members, vec![ALICE]);
        assert_eq!(proposers.name, Some(Role::Proposer));
    }

    #[test]
    fn test_role_replay_lists_known_roles_first() {
        let custom = B256::repeat_byte(0x01);
        let grants = vec![event_log(granted(custom, ALICE), 1, 0)];

        let roles = replay_role_members(&grants, &[]);

        assert_eq!(roles.len(), Role::ALL.len() + 1);
        assert!(roles[..Role::ALL.len()].iter().all(|r| r.name.is_some()));
        assert_eq!(roles[0].role, B256::ZERO);
        let last = roles.last().unwrap();
        assert_eq!(last.role, custom);
        assert_eq!(last.name, None);
        assert_eq!(last.members, vec![ALICE]);
        assert!(roles
            .iter()
            .find(|r| r.role == EXECUTOR_ROLE)
            .is_some_and(|r| r.members.is_empty()));
    }

    #[tokio::test]
    async fn test_query_current_delays_from_logs() {
        let logs = FakeLogProvider::new();
        logs.set_head(100);
        logs.push_log(rpc_log(
            &delay_change(TARGET_A, fixed_bytes!("6773522c"), true, 10),
            20,
            0,
        ));
        logs.push_log(rpc_log(
            &delay_change(TARGET_A, fixed_bytes!("6773522c"), false, 0),
            60,
            0,
        ));

        let delays = query_current_delays(&logs, NETWORK, 0, &WatchConfig::default())
            .await
            .unwrap();

        assert_eq!(delays.len(), 1);
        assert!(!delays[0].enabled);
        assert_eq!(delays[0].block_number, Some(60));
    }

    #[tokio::test]
    async fn test_query_scheduled_operations_from_logs() {
        let id = B256::repeat_byte(3);
        let logs = FakeLogProvider::new();
        logs.set_head(50);
        logs.push_log(rpc_log(&scheduled(id, 1, TARGET_B), 10, 0));
        logs.push_log(rpc_log(&scheduled(id, 0, TARGET_A), 10, 1));
        logs.push_log(rpc_log(
            &CallSalt {
                id,
                salt: B256::repeat_byte(4),
            },
            10,
            2,
        ));
        // Outside the queried range
        logs.push_log(rpc_log(&scheduled(B256::repeat_byte(8), 0, TARGET_A), 2, 0));

        let operations = query_scheduled_operations(&logs, NETWORK, 5, &WatchConfig::default())
            .await
            .unwrap();

        assert_eq!(operations.len(), 1);
        assert_eq!(operations[0].salt, B256::repeat_byte(4));
        assert_eq!(operations[0].calls[0].target, TARGET_A);
        assert_eq!(operations[0].state, OperationState::Unset);
        let queries = logs.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].topics[0].matches(&CallScheduled::SIGNATURE_HASH));
        assert!(queries[1].topics[0].matches(&CallSalt::SIGNATURE_HASH));
    }

    #[tokio::test]
    async fn test_query_role_members_from_logs() {
        let logs = FakeLogProvider::new();
        logs.set_head(50);
        logs.push_log(rpc_log(&granted(EXECUTOR_ROLE, ALICE), 1, 0));
        logs.push_log(rpc_log(&granted(EXECUTOR_ROLE, BOB), 2, 0));
        logs.push_log(rpc_log(&revoked(EXECUTOR_ROLE, ALICE), 3, 0));

        let roles = query_role_members(&logs, NETWORK, 0, &WatchConfig::default())
            .await
            .unwrap();

        let executors = roles.iter().find(|r| r.role == EXECUTOR_ROLE).unwrap();
        assert_eq!(executors.members, vec![BOB]);
        assert_eq!(executors.admin, None);
    }

    #[tokio::test]
    async fn test_query_role_members_propagates_provider_failure() {
        let logs = FakeLogProvider::new();
        logs.set_head(50);
        logs.fail_next_get_logs();

        let result = query_role_members(&logs, NETWORK, 0, &WatchConfig::default()).await;

        assert!(result.is_err());
    }
}
