//! HTML bodies are built per call as plain strings; the transactional
//! provider receives the finished markup.

use crate::mailer::OutboundMail;
use crate::models::assignment::FeeTier;
use crate::models::job::JobRequest;

pub fn job_invite(
    to: &str,
    driver_name: &str,
    job: &JobRequest,
    accept_url: &str,
    decline_url: &str,
) -> OutboundMail {
    let html = format!(
        "<html><body>\
         <p>Hello {driver_name},</p>\
         <p>A new job is available:</p>\
         <ul>\
         <li>Location: {location}</li>\
         <li>Period: {period}</li>\
         <li>Vehicle: {vehicle}</li>\
         <li>License class: {license}</li>\
         </ul>\
         <p><a href=\"{accept_url}\">Accept this job</a></p>\
         <p><a href=\"{decline_url}\">Decline</a></p>\
         <p>The links are personal to you and expire in 48 hours.</p>\
         </body></html>",
        location = job.location,
        period = job.period,
        vehicle = job.vehicle_type,
        license = job.license_class,
    );

    OutboundMail {
        to: to.to_string(),
        subject: format!("New driver job in {}", job.location),
        html,
    }
}

pub fn assignment_confirmed(to: &str, job: &JobRequest, driver_name: &str) -> OutboundMail {
    let html = format!(
        "<html><body>\
         <p>Job {id} ({location}, {period}) has been assigned to {driver_name}.</p>\
         </body></html>",
        id = job.id,
        location = job.location,
        period = job.period,
    );

    OutboundMail {
        to: to.to_string(),
        subject: format!("Driver assigned for job in {}", job.location),
        html,
    }
}

pub fn no_show_notice(to: &str, job: &JobRequest, tier: FeeTier, fee_minor: i64) -> OutboundMail {
    let html = format!(
        "<html><body>\
         <p>Dear {name},</p>\
         <p>The assigned driver for your job in {location} did not appear. \
         A cancellation fee of {euros}.{cents:02} (notice tier {tier}) has been recorded \
         and we are arranging a replacement.</p>\
         </body></html>",
        name = job.customer_name,
        location = job.location,
        euros = fee_minor / 100,
        cents = fee_minor % 100,
        tier = tier.as_str(),
    );

    OutboundMail {
        to: to.to_string(),
        subject: "Driver no-show on your booking".to_string(),
        html,
    }
}

pub fn newsletter(to: &str, display_name: &str, subject: &str, body_html: &str) -> OutboundMail {
    let html = format!(
        "<html><body><p>Dear {display_name},</p>{body_html}</body></html>"
    );

    OutboundMail {
        to: to.to_string(),
        subject: subject.to_string(),
        html,
    }
}
