pub mod altimeter;
pub mod button_handler;
pub mod led_matrix;
pub mod serial_console;
pub mod transmitter;

pub use altimeter::{map_to_altitude, Altimeter, AltitudeBand};
pub use button_handler::{Button, ButtonHandler};
pub use led_matrix::LedMatrix;
pub use serial_console::SerialConsole;
pub use transmitter::{Transmitter, TxStatus};
