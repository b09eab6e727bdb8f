/// Identifies one scheduled request.
///
/// Every `schedule`/`trigger` bumps the owner's generation; a ticket from an older generation is
/// stale and its result should be dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticket(u64);

impl Ticket {
    pub const fn generation(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Coalesces bursts into at most one delivery per frame.
///
/// `schedule` replaces any pending payload; the host calls [`Self::on_frame`] from its frame
/// callback to take the latest one.
#[derive(Clone, Debug)]
pub struct FrameThrottle<T> {
    pending: Option<T>,
    ticket: Ticket,
}

impl<T> Default for FrameThrottle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameThrottle<T> {
    pub const fn new() -> Self {
        Self {
            pending: None,
            ticket: Ticket(0),
        }
    }

    pub fn schedule(&mut self, payload: T) -> Ticket {
        self.pending = Some(payload);
        self.ticket = self.ticket.next();
        self.ticket
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn on_frame(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drops the pending payload; its ticket becomes stale.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.ticket = self.ticket.next();
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.ticket == ticket
    }
}

/// Leading-edge time throttle: the first trigger fires, later triggers are dropped until more
/// than `delay_ms` has passed since the last delivery.
#[derive(Clone, Debug)]
pub struct Throttle<T> {
    delay_ms: u64,
    last_fire_ms: Option<u64>,
    ticket: Ticket,
    _payload: core::marker::PhantomData<fn(T)>,
}

impl<T> Throttle<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            last_fire_ms: None,
            ticket: Ticket(0),
            _payload: core::marker::PhantomData,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Returns the payload back when it should be delivered now, `None` when it is dropped.
    pub fn trigger(&mut self, payload: T, now_ms: u64) -> Option<(Ticket, T)> {
        if let Some(last) = self.last_fire_ms {
            if now_ms.saturating_sub(last) <= self.delay_ms {
                return None;
            }
        }
        self.last_fire_ms = Some(now_ms);
        self.ticket = self.ticket.next();
        Some((self.ticket, payload))
    }

    /// Forgets the last delivery so the next trigger fires immediately.
    pub fn cancel(&mut self) {
        self.last_fire_ms = None;
        self.ticket = self.ticket.next();
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.ticket == ticket
    }
}

/// Trailing-edge debounce: each trigger replaces the payload and restarts the timer; `poll`
/// delivers once `delay_ms` passed without another trigger.
#[derive(Clone, Debug)]
pub struct Debounce<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
    ticket: Ticket,
}

impl<T> Debounce<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
            ticket: Ticket(0),
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn trigger(&mut self, payload: T, now_ms: u64) -> Ticket {
        self.pending = Some((payload, now_ms.saturating_add(self.delay_ms)));
        self.ticket = self.ticket.next();
        self.ticket
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The time at which the pending payload becomes due.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now_ms >= *due => self.pending.take().map(|(p, _)| p),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.ticket = self.ticket.next();
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.ticket == ticket
    }
}
