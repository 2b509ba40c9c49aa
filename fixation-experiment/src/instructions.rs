//! Screen texts shown by the session script.

pub const WELCOME: &str = "Welcome to eye-fixation training. Press the spacebar to begin.";

pub const PAGES: [&str; 3] = [
    "A circular gray field will soon appear. Keep your eyes on the black dot in the \
     center and try to minimize eye movements. If you see a random dot pattern pop out \
     from the gray field, this means that you have made an eye movement. Press the \
     spacebar to continue.",
    "There will be multiple intervals, each of which lasts for 3 to 5 seconds.",
    "There may be an arrow pointing towards one side of the screen. If so, a white line \
     will appear on that side. Try to pay attention to the direction the line points \
     WITHOUT moving your eyes. Press space to start.",
];

pub const INTERVAL_PROMPT: &str = "Press the spacebar to start interval.";
