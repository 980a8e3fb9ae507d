mod phase;
mod provisioner;
mod window_id;
