mod envelope;
mod homing;
mod paper_feed;
mod printer_flow;
