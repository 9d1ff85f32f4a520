//! Shared-machine cell and the split into the two context handles.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use crate::command::CommandQueue;
use crate::hal::{CoilPort, StepClock, Watchdog};

use super::driver::{Machine, TickDriver};
use super::port::CommandPort;

/// A [`Machine`] shared between the producer context and the tick interrupt.
///
/// Every access goes through a critical section, so multi-field updates
/// (position plus state plus pen, as homing does) are never observed
/// half-written. The command queue deliberately lives outside the cell; it
/// is lock-free on its own.
///
/// Place the cell (and the queue) somewhere that outlives both handles, in
/// firmware typically a `static`:
///
/// ```ignore
/// static QUEUE: ... // owned by main, handed to attach()
/// let cell = MachineCell::new(machine);
/// let (port, mut ticker) = cell.attach(&mut queue, watchdog);
/// ```
pub struct MachineCell<XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    inner: Mutex<RefCell<Machine<XP, YP, PEN, PWM, HOME, STOP, CLK>>>,
}

impl<XP, YP, PEN, PWM, HOME, STOP, CLK> MachineCell<XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    /// Wrap a built machine in the shared cell.
    pub fn new(machine: Machine<XP, YP, PEN, PWM, HOME, STOP, CLK>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(machine)),
        }
    }

    /// Run `f` on the machine inside a critical section.
    ///
    /// Keep `f` short; the tick interrupt is locked out for its duration.
    pub(crate) fn with<R>(
        &self,
        f: impl FnOnce(&mut Machine<XP, YP, PEN, PWM, HOME, STOP, CLK>) -> R,
    ) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Split the shared machine into its two context handles.
    ///
    /// The [`CommandPort`] goes to the producer context (main loop, command
    /// decoder); the [`TickDriver`] goes to the step timer interrupt. The
    /// queue halves are claimed here, which is what makes the pairing
    /// single-producer/single-consumer.
    pub fn attach<'a, WD>(
        &'a self,
        queue: &'a mut CommandQueue,
        watchdog: WD,
    ) -> (
        CommandPort<'a, XP, YP, PEN, PWM, HOME, STOP, CLK, WD>,
        TickDriver<'a, XP, YP, PEN, PWM, HOME, STOP, CLK>,
    )
    where
        WD: Watchdog,
    {
        let (producer, consumer) = queue.split();
        (
            CommandPort::new(self, producer, watchdog),
            TickDriver::new(self, consumer),
        )
    }
}
