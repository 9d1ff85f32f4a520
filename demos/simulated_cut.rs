//! Simulated cutting session.
//!
//! Drives the full machine workflow against mock hardware: homing, media
//! load, a square cut, an operator stop, and media unload. The tick
//! interrupt is played by a plain loop.
//!
//! Run with: `cargo run --example simulated_cut`

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use cutter_motion::{
    CoilPort, CommandQueue, Machine, MachineCell, MachineConfig, Point, Speed, StepClock, Steps,
    COILS_OFF,
};

/// Coil port that remembers the last pattern driven.
#[derive(Clone, Default)]
struct SimCoils {
    last: Arc<AtomicU8>,
}

impl CoilPort for SimCoils {
    type Error = core::convert::Infallible;

    fn drive(&mut self, pattern: u8) -> Result<(), Self::Error> {
        self.last.store(pattern, Ordering::Relaxed);
        Ok(())
    }
}

/// Pin with a level the demo can observe or steer.
#[derive(Clone)]
struct SimPin {
    high: Arc<AtomicBool>,
}

impl SimPin {
    fn new(high: bool) -> Self {
        Self {
            high: Arc::new(AtomicBool::new(high)),
        }
    }
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high.store(true, Ordering::Relaxed);
        Ok(())
    }
}

impl embedded_hal::digital::InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high.load(Ordering::Relaxed))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high.load(Ordering::Relaxed))
    }
}

/// Home switch that trips on the first seek poll.
#[derive(Default)]
struct SimHomeSwitch {
    polls: usize,
}

impl embedded_hal::digital::ErrorType for SimHomeSwitch {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for SimHomeSwitch {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let level = self.polls != 0; // active low
        self.polls += 1;
        Ok(level)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|level| !level)
    }
}

/// PWM that narrates duty changes.
struct SimPwm;

impl embedded_hal::pwm::ErrorType for SimPwm {
    type Error = core::convert::Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_duty_cycle_fraction(&mut self, num: u16, denom: u16) -> Result<(), Self::Error> {
        println!("[pwm] pressure duty {num}/{denom}");
        Ok(())
    }
}

/// Step clock that narrates rate changes.
struct SimClock;

impl StepClock for SimClock {
    fn set_step_rate(&mut self, rate: Speed) {
        println!("[clock] step rate {}", rate.value());
    }
}

fn main() -> cutter_motion::Result<()> {
    println!("=== Simulated Cutting Session ===\n");

    let x_coils = SimCoils::default();
    let y_coils = SimCoils::default();
    let pen = SimPin::new(false);
    let stop = SimPin::new(true); // active low: released

    // a small mat so the session stays readable
    let mut config = MachineConfig::default();
    config.travel.max_x = Steps(400);
    config.travel.max_y = Steps(200);
    config.travel.mat_edge = Steps(40);
    config.travel.home_lead = Steps(16);
    config.timing.settle_ticks = 5;
    config.timing.idle_timeout_ticks = 50;

    let machine = Machine::builder()
        .config(&config)
        .x_coils(x_coils.clone())
        .y_coils(y_coils.clone())
        .pen(pen.clone())
        .pressure_pwm(SimPwm)
        .home_switch(SimHomeSwitch::default())
        .stop_button(stop.clone())
        .step_clock(SimClock)
        .build()?;

    println!("machine: {}", machine.name());

    let cell = MachineCell::new(machine);
    let mut queue = CommandQueue::new();
    let (mut port, mut ticker) = cell.attach(&mut queue, ());

    // -- homing ------------------------------------------------------------
    println!("\n--- Homing ---");
    println!("start position: {:?}", port.position());
    port.home()?;
    let mut ticks = 0usize;
    while !port.is_idle() {
        ticker.tick()?;
        ticks += 1;
    }
    println!("homed in {ticks} ticks, position {:?}", port.position());

    // -- media load --------------------------------------------------------
    println!("\n--- Loading media ---");
    port.load_media()?;
    drain(&port, &mut ticker)?;
    println!("media at {:?}, loaded: {}", port.position(), port.is_media_loaded());

    // -- cut a square, tracing the pen -------------------------------------
    println!("\n--- Cutting a 20x20 square ---");
    port.move_to(Point::steps(4, 4));
    port.draw_to(Point::steps(24, 4));
    port.draw_to(Point::steps(24, 24));
    port.draw_to(Point::steps(4, 24));
    port.draw_to(Point::steps(4, 4));
    port.move_to(Point::ORIGIN);

    let mut cut_points = Vec::new();
    while !port.is_idle() {
        ticker.tick()?;
        if port.is_pen_down() {
            cut_points.push(port.position());
        }
    }
    cut_points.dedup();
    println!("cut {} points, parked at {:?}", cut_points.len(), port.position());
    render(&cut_points);

    // -- operator stop mid-job ---------------------------------------------
    println!("\n--- Operator stop ---");
    port.draw_to(Point::steps(200, 0));
    port.draw_to(Point::steps(200, 100));
    for _ in 0..80 {
        ticker.tick()?;
    }
    println!("mid-cut at {:?}, queued {}", port.position(), port.queued());

    stop.high.store(false, Ordering::Relaxed); // press
    ticker.tick()?;
    println!(
        "after stop: queued {}, pen down {}, coils 0x{:02X}",
        port.queued(),
        port.is_pen_down(),
        x_coils.last.load(Ordering::Relaxed),
    );
    assert_eq!(x_coils.last.load(Ordering::Relaxed), COILS_OFF);
    stop.high.store(true, Ordering::Relaxed); // release

    // -- unload ------------------------------------------------------------
    println!("\n--- Unloading media ---");
    port.unload_media()?;
    drain(&port, &mut ticker)?;
    println!("media at {:?}, loaded: {}", port.position(), port.is_media_loaded());

    println!("\n=== Session Complete ===");
    println!("In firmware, ticker.tick() runs from the step timer interrupt");
    println!("and the port calls come from the command decoder.");
    Ok(())
}

/// Tick until the machine reports idle.
fn drain<XP, YP, PEN, PWM, HOME, STOP, CLK, WD>(
    port: &cutter_motion::CommandPort<'_, XP, YP, PEN, PWM, HOME, STOP, CLK, WD>,
    ticker: &mut cutter_motion::TickDriver<'_, XP, YP, PEN, PWM, HOME, STOP, CLK>,
) -> cutter_motion::Result<()>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: embedded_hal::digital::OutputPin,
    PWM: embedded_hal::pwm::SetDutyCycle,
    HOME: embedded_hal::digital::InputPin,
    STOP: embedded_hal::digital::InputPin,
    CLK: StepClock,
    WD: cutter_motion::Watchdog,
{
    while !port.is_idle() {
        ticker.tick()?;
    }
    Ok(())
}

/// ASCII render of the cut, Y up.
fn render(points: &[Point]) {
    let max_x = points.iter().map(|p| p.x.value()).max().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y.value()).max().unwrap_or(0);

    let mut canvas = vec![vec![b'.'; (max_x + 1) as usize]; (max_y + 1) as usize];
    for p in points {
        canvas[p.y.value() as usize][p.x.value() as usize] = b'#';
    }

    for row in canvas.iter().rev() {
        println!("  {}", String::from_utf8_lossy(row));
    }
}
