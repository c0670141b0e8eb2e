mod ip;
pub use ip::IpDelete;

mod network;
pub use network::NetworkDelete;

mod machine;
pub use machine::{MachineAllocation, MachineDelete};

mod bmc;
pub use bmc::{BmcCommand, BmcCommandDone, BmcOp};
