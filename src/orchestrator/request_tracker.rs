//! 外部请求令牌
//!
//! 每个逻辑槽位同时只认最新的一次请求：新请求发出后，旧请求的结果到达时直接丢弃。

/// 逻辑槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSlot {
    /// 候选题库刷新
    Bank,
    /// AI 按结构出题
    Generation,
}

/// 一次请求的令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    slot: RequestSlot,
    token: u64,
}

impl RequestTicket {
    pub fn slot(&self) -> RequestSlot {
        self.slot
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

/// 每个槽位一个单调递增的计数器
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    bank: u64,
    generation: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发出新请求，之前发出的同槽位令牌全部失效
    pub fn issue(&mut self, slot: RequestSlot) -> RequestTicket {
        let counter = self.counter_mut(slot);
        *counter += 1;
        RequestTicket {
            slot,
            token: *counter,
        }
    }

    /// 令牌是否仍是该槽位最新的请求
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.counter(ticket.slot) == ticket.token
    }

    /// 作废槽位上所有在途请求
    pub fn invalidate(&mut self, slot: RequestSlot) {
        *self.counter_mut(slot) += 1;
    }

    pub fn invalidate_all(&mut self) {
        self.invalidate(RequestSlot::Bank);
        self.invalidate(RequestSlot::Generation);
    }

    fn counter(&self, slot: RequestSlot) -> u64 {
        match slot {
            RequestSlot::Bank => self.bank,
            RequestSlot::Generation => self.generation,
        }
    }

    fn counter_mut(&mut self, slot: RequestSlot) -> &mut u64 {
        match slot {
            RequestSlot::Bank => &mut self.bank,
            RequestSlot::Generation => &mut self.generation,
        }
    }
}
