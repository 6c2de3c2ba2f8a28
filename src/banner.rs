/// Usage notes printed once when the gate is loaded.
pub const LINES: &[&str] = &[
    "Debug gate loaded.",
    "Usage:",
    "  - setDebugEnabled(true/false): enable or disable debug output",
    "  - setDebugLevel(\"debug\"/\"info\"/\"warn\"/\"error\"): set the log level",
    "  - debug(\"message\"): print a debug message",
    "  - debugModule(\"name\").info(\"message\"): print a message tagged with a module",
    "  - getDebugStatus(): show the current debug state",
    "  - toggleDebug(): switch debug output on or off",
    "",
    "Quick reference:",
    "  toggleDebug()            // switch debug output on or off",
    "  setDebugLevel(\"debug\")   // show every message",
    "  setDebugLevel(\"info\")    // info and above only",
    "  getDebugStatus()         // inspect the current state",
];
